use crate::handler::RequestHandler;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::error;

const INTERNAL_SERVER_ERROR_BODY: &str = "Internal Server Error";

/// Turns a panic raised downstream into a `500 Internal Server Error` response
#[derive(Debug, Clone, Copy, Default)]
pub struct CatchPanicMiddleware;

impl CatchPanicMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for CatchPanicMiddleware {
    fn apply(&self, handler: Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> {
        Arc::new(CatchPanicHandler { inner: handler })
    }
}

struct CatchPanicHandler {
    inner: Arc<dyn RequestHandler>,
}

#[async_trait]
impl RequestHandler for CatchPanicHandler {
    async fn handle(&self, req: &Request) -> Response {
        match AssertUnwindSafe(self.inner.handle(req)).catch_unwind().await {
            Ok(response) => response,
            Err(payload) => {
                error!(method = %req.method(), path = req.path(), cause = panic_message(payload.as_ref()), "handler panicked");
                Response::server_error(INTERNAL_SERVER_ERROR_BODY)
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::media::MediaType;
    use http::{Method, StatusCode};

    #[tokio::test]
    async fn panic_becomes_server_error() {
        let handler: Arc<dyn RequestHandler> = Arc::new(handler_fn(|req: &Request| -> Response {
            panic!("boom at {}", req.path());
        }));

        let response = CatchPanicMiddleware::new().apply(handler).handle(&Request::new(Method::GET, "/boom")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.media_type(), &MediaType::TEXT_PLAIN);
        assert_eq!(response.body().as_text(), Some("Internal Server Error"));
    }

    #[tokio::test]
    async fn normal_response_passes_through() {
        let handler: Arc<dyn RequestHandler> = Arc::new(handler_fn(|_req: &Request| Response::created("made")));

        let response = CatchPanicMiddleware::new().apply(handler).handle(&Request::new(Method::POST, "/")).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body().as_text(), Some("made"));
    }

    #[test]
    fn reads_panic_payloads() {
        let static_payload: Box<dyn Any + Send> = Box::new("static");
        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other_payload: Box<dyn Any + Send> = Box::new(42_u8);

        assert_eq!(panic_message(static_payload.as_ref()), "static");
        assert_eq!(panic_message(owned_payload.as_ref()), "owned");
        assert_eq!(panic_message(other_payload.as_ref()), "unknown panic");
    }
}
