use crate::handler::RequestHandler;
use crate::middleware::Middleware;
use crate::middleware::catch_panic::panic_message;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

/// Logs `METHOD path` before the inner handler and `METHOD path - status` after it.
///
/// A panic escaping the inner handler is logged and resumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for LoggingMiddleware {
    fn apply(&self, handler: Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> {
        Arc::new(LoggingHandler { inner: handler })
    }
}

struct LoggingHandler {
    inner: Arc<dyn RequestHandler>,
}

#[async_trait]
impl RequestHandler for LoggingHandler {
    async fn handle(&self, req: &Request) -> Response {
        info!("{} {}", req.method(), req.path());

        match AssertUnwindSafe(self.inner.handle(req)).catch_unwind().await {
            Ok(response) => {
                info!("{} {} - {}", req.method(), req.path(), response.status().as_u16());
                response
            }
            Err(payload) => {
                error!("{} {} - ERROR: {}", req.method(), req.path(), panic_message(payload.as_ref()));
                std::panic::resume_unwind(payload)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::middleware::CatchPanicMiddleware;
    use http::{Method, StatusCode};

    #[tokio::test]
    async fn response_passes_through_unchanged() {
        let handler: Arc<dyn RequestHandler> = Arc::new(handler_fn(|_req: &Request| Response::bad_request("nope")));

        let response = LoggingMiddleware::new().apply(handler).handle(&Request::new(Method::GET, "/q")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body().as_text(), Some("nope"));
    }

    #[tokio::test]
    async fn panic_is_raised_again() {
        let handler: Arc<dyn RequestHandler> = Arc::new(handler_fn(|_req: &Request| -> Response { panic!("kaput") }));
        let logged = LoggingMiddleware::new().apply(handler);

        let outcome = AssertUnwindSafe(logged.handle(&Request::new(Method::GET, "/"))).catch_unwind().await;

        let payload = outcome.err().unwrap();
        assert_eq!(panic_message(payload.as_ref()), "kaput");
    }

    #[tokio::test]
    async fn outer_catch_panic_still_answers() {
        let handler: Arc<dyn RequestHandler> = Arc::new(handler_fn(|_req: &Request| -> Response { panic!("kaput") }));
        let wrapped = CatchPanicMiddleware::new().apply(LoggingMiddleware::new().apply(handler));

        let response = wrapped.handle(&Request::new(Method::GET, "/")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
