//! The seam between the wire layer and the application.
//!
//! A [`Handler`] receives the decoded [`RequestHead`] of a request and always answers
//! with exactly one response; failures are expected to be turned into error responses
//! before they reach the wire layer.

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;

use crate::protocol::RequestHead;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, head: RequestHead) -> Response<Bytes>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(RequestHead) -> Fut + Send + Sync,
    Fut: Future<Output = Response<Bytes>> + Send,
{
    async fn call(&self, head: RequestHead) -> Response<Bytes> {
        (self.f)(head).await
    }
}

/// Adapts an async function into a [`Handler`].
pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(RequestHead) -> Fut,
    Fut: Future<Output = Response<Bytes>>,
{
    HandlerFn { f }
}
