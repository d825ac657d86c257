use crate::handler::RequestHandler;
use crate::media::X_RESPONSE_TIME;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use http::HeaderValue;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Measures the inner handler and records the elapsed milliseconds in `x-response-time`
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingMiddleware;

impl TimingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for TimingMiddleware {
    fn apply(&self, handler: Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> {
        Arc::new(TimingHandler { inner: handler })
    }
}

struct TimingHandler {
    inner: Arc<dyn RequestHandler>,
}

#[async_trait]
impl RequestHandler for TimingHandler {
    async fn handle(&self, req: &Request) -> Response {
        let start = Instant::now();
        let mut response = self.inner.handle(req).await;
        let elapsed_ms = start.elapsed().as_millis();

        debug!("Request to {} {} took {}ms", req.method(), req.path(), elapsed_ms);

        response.headers_mut().insert(X_RESPONSE_TIME, elapsed_ms_header(elapsed_ms));
        response
    }
}

fn elapsed_ms_header(elapsed_ms: u128) -> HeaderValue {
    HeaderValue::from_str(&format!("{elapsed_ms}ms")).unwrap_or_else(|_| HeaderValue::from_static("0ms"))
}
