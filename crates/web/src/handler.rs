use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use http::StatusCode;

use std::sync::Arc;

/// Body answered by [`DefaultNotFoundHandler`]
pub const NOT_FOUND_BODY: &str =
    "<html><body><h1>404 - Not Found</h1><p>The requested resource was not found.</p></body></html>";

/// Application code answering a routed request.
///
/// A handler always produces a response; failures are expressed as error responses
/// such as [`Response::server_error`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, req: &Request) -> Response;
}

#[async_trait]
impl<H: RequestHandler + ?Sized> RequestHandler for Arc<H> {
    async fn handle(&self, req: &Request) -> Response {
        self.as_ref().handle(req).await
    }
}

#[async_trait]
impl<H: RequestHandler + ?Sized> RequestHandler for Box<H> {
    async fn handle(&self, req: &Request) -> Response {
        self.as_ref().handle(req).await
    }
}

/// a synchronous closure holder which acts as a [`RequestHandler`]
#[derive(Debug, Clone)]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> RequestHandler for FnHandler<F>
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    async fn handle(&self, req: &Request) -> Response {
        (self.f)(req)
    }
}

/// Answers every request with a 404 HTML page
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNotFoundHandler;

#[async_trait]
impl RequestHandler for DefaultNotFoundHandler {
    async fn handle(&self, _req: &Request) -> Response {
        Response::html(NOT_FOUND_BODY).with_status(StatusCode::NOT_FOUND)
    }
}
