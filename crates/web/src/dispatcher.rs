//! Routes a request and runs it through the middleware chain.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use marga_http::handler::Handler;
use marga_http::protocol::RequestHead;
use tracing::debug;

use crate::handler::{DefaultNotFoundHandler, RequestHandler};
use crate::middleware::MiddlewareChain;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Owns the route table, the middleware chain and the not-found handler.
///
/// Every request yields exactly one response: a matched route's handler or the
/// not-found handler, both wrapped by the full middleware chain.
pub struct Dispatcher {
    router: Router,
    middleware: MiddlewareChain,
    not_found: Arc<dyn RequestHandler>,
}

impl Dispatcher {
    pub fn new(router: Router, middleware: MiddlewareChain) -> Self {
        Self { router, middleware, not_found: Arc::new(DefaultNotFoundHandler) }
    }

    pub fn with_not_found_handler(mut self, not_found: Arc<dyn RequestHandler>) -> Self {
        self.not_found = not_found;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }

    pub async fn handle(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        query_params: HashMap<String, String>,
    ) -> Response {
        let request = Request::new(method, path).with_headers(headers).with_query_params(query_params);
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, mut request: Request) -> Response {
        let handler = match self.router.at(request.method(), request.path()) {
            Some(route_match) => {
                let handler = Arc::clone(route_match.handler());
                request.merge_path_params(route_match.into_params());
                handler
            }
            None => {
                debug!(method = %request.method(), path = request.path(), "no route matched");
                Arc::clone(&self.not_found)
            }
        };

        self.middleware.compose(handler).handle(&request).await
    }
}

#[async_trait]
impl Handler for Dispatcher {
    async fn call(&self, head: RequestHead) -> http::Response<Bytes> {
        self.dispatch(Request::from(head)).await.into()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("router", &self.router)
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{MockRequestHandler, NOT_FOUND_BODY, handler_fn};
    use crate::middleware::middleware_fn;
    use crate::router::{get, post};
    use async_trait::async_trait;
    use http::{HeaderValue, StatusCode};
    use std::sync::Mutex;

    fn dispatcher(middleware: MiddlewareChain) -> Dispatcher {
        let mut router = Router::new();
        router
            .route("/", get(handler_fn(|_req: &Request| Response::ok("root"))))
            .unwrap()
            .route(
                "/users/${id}/posts/${postId}",
                get(handler_fn(|req: &Request| {
                    Response::ok(format!("{}:{}", req.path_param("id").unwrap(), req.path_param("postId").unwrap()))
                })),
            )
            .unwrap()
            .route(
                "/search",
                post(handler_fn(|req: &Request| {
                    Response::ok(format!("{}|{}", req.query_param("q").unwrap_or("-"), req.header("x-trace").unwrap_or("-")))
                })),
            )
            .unwrap();
        Dispatcher::new(router, middleware)
    }

    #[tokio::test]
    async fn matched_route_receives_path_params() {
        let response =
            dispatcher(MiddlewareChain::new()).handle(Method::GET, "/users/123/posts/456", HeaderMap::new(), HashMap::new()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_text(), Some("123:456"));
    }

    #[tokio::test]
    async fn headers_and_query_reach_the_handler() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace", HeaderValue::from_static("t-1"));
        let query = HashMap::from([("q".to_owned(), "rust lang".to_owned())]);

        let response = dispatcher(MiddlewareChain::new()).handle(Method::POST, "/search", headers, query).await;

        assert_eq!(response.body().as_text(), Some("rust lang|t-1"));
    }

    struct Observe {
        seen: Arc<Mutex<Vec<(String, StatusCode)>>>,
        inner: Arc<dyn RequestHandler>,
    }

    #[async_trait]
    impl RequestHandler for Observe {
        async fn handle(&self, req: &Request) -> Response {
            let response = self.inner.handle(req).await;
            self.seen.lock().unwrap().push((req.path().to_owned(), response.status()));
            response
        }
    }

    #[tokio::test]
    async fn missing_route_answers_404_through_middleware() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let observed = Arc::clone(&seen);
        let mut chain = MiddlewareChain::new();
        chain.add(middleware_fn(move |inner| {
            Arc::new(Observe { seen: Arc::clone(&observed), inner }) as Arc<dyn RequestHandler>
        }));

        let response = dispatcher(chain).handle(Method::GET, "/missing", HeaderMap::new(), HashMap::new()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body().as_text(), Some(NOT_FOUND_BODY));
        assert_eq!(*seen.lock().unwrap(), [("/missing".to_owned(), StatusCode::NOT_FOUND)]);
    }

    #[tokio::test]
    async fn custom_not_found_handler_is_used() {
        let mut not_found = MockRequestHandler::new();
        not_found
            .expect_handle()
            .withf(|req: &Request| req.path() == "/nowhere" && req.method() == Method::DELETE)
            .times(1)
            .returning(|_| Response::not_found("custom"));

        let dispatcher = dispatcher(MiddlewareChain::new()).with_not_found_handler(Arc::new(not_found));
        let response = dispatcher.handle(Method::DELETE, "/nowhere", HeaderMap::new(), HashMap::new()).await;

        assert_eq!(response.body().as_text(), Some("custom"));
    }

    #[tokio::test]
    async fn wire_handler_sets_content_type() {
        let head = RequestHead::new(Method::GET, "/");

        let response = dispatcher(MiddlewareChain::new()).call(head).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.body().as_ref(), b"root");
    }
}
