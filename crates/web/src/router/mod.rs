//! The route table.
//!
//! Routes without placeholders are exact routes, looked up by method and path. Routes
//! whose path contains `${` are parameterized: they are scanned in registration order,
//! the longest matching template wins and ties go to the route registered first.
//! Parameterized matching looks at the path only; the request method is not consulted.

use crate::handler::RequestHandler;
use crate::pattern::{PathPattern, PatternError};

use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Main router structure that holds every registered route
#[derive(Debug, Default)]
pub struct Router {
    exact_routes: HashMap<String, Route>,
    parameterized_routes: Vec<Route>,
}

/// A registered handler together with its method, path and optional description
pub struct Route {
    method: Method,
    path: String,
    pattern: PathPattern,
    handler: Arc<dyn RequestHandler>,
    handler_name: String,
    description: Option<String>,
}

/// Result of matching a route: the route and the path parameters it extracted
#[derive(Debug)]
pub struct RouteMatch<'router> {
    route: &'router Route,
    params: HashMap<String, String>,
}

/// One line of the route listing printed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescription {
    pub method: Method,
    pub path: String,
    pub description: String,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` and `path`.
    ///
    /// A path containing `${` is compiled as a template and appended to the parameterized
    /// routes; an invalid template fails here. Any other path replaces a previous route
    /// under the same method and path.
    pub fn register<H>(
        &mut self,
        method: Method,
        path: &str,
        handler: H,
        description: Option<&str>,
    ) -> Result<&mut Self, PatternError>
    where
        H: RequestHandler + 'static,
    {
        let handler_name = short_type_name::<H>();
        self.insert(method, path, Arc::new(handler), handler_name, description.map(str::to_owned))
    }

    /// Registers a route built by [`get`], [`post`] and the other method functions
    pub fn route(&mut self, path: &str, builder: RouteBuilder) -> Result<&mut Self, PatternError> {
        let RouteBuilder { method, handler, handler_name, description } = builder;
        self.insert(method, path, handler, handler_name, description)
    }

    fn insert(
        &mut self,
        method: Method,
        path: &str,
        handler: Arc<dyn RequestHandler>,
        handler_name: String,
        description: Option<String>,
    ) -> Result<&mut Self, PatternError> {
        if path.contains("${") {
            let pattern = PathPattern::compile(path)?;
            debug!(%method, path, "register parameterized route");
            self.parameterized_routes.push(Route {
                method,
                path: path.to_owned(),
                pattern,
                handler,
                handler_name,
                description,
            });
        } else {
            let key = route_key(&method, path);
            debug!(%method, path, "register exact route");
            let route =
                Route { method, path: path.to_owned(), pattern: PathPattern::default(), handler, handler_name, description };
            if self.exact_routes.insert(key, route).is_some() {
                debug!(path, "replaced previously registered route");
            }
        }
        Ok(self)
    }

    /// Matches a request against the table
    ///
    /// An exact route for `method` and `path` wins outright. Otherwise the longest
    /// parameterized template matching `path` is chosen, whatever its method.
    pub fn at<'router>(&'router self, method: &Method, path: &str) -> Option<RouteMatch<'router>> {
        if let Some(route) = self.exact_routes.get(&route_key(method, path)) {
            return Some(RouteMatch { route, params: HashMap::new() });
        }

        let mut longest: Option<(&Route, usize)> = None;
        for route in self.parameterized_routes.iter().filter(|route| route.matches(path)) {
            let length = route.template_len();
            if longest.is_none_or(|(_, longest_length)| length > longest_length) {
                longest = Some((route, length));
            }
        }

        longest.map(|(route, _)| RouteMatch { route, params: route.pattern.extract(path) })
    }

    /// Lists exact routes ordered by method and path, then parameterized routes from
    /// the longest template to the shortest.
    pub fn descriptions(&self) -> Vec<RouteDescription> {
        let mut exact = self.exact_routes.iter().collect::<Vec<_>>();
        exact.sort_by(|(left, _), (right, _)| left.cmp(right));

        let mut parameterized = self.parameterized_routes.iter().collect::<Vec<_>>();
        parameterized.sort_by(|left, right| right.template_len().cmp(&left.template_len()));

        exact.into_iter().map(|(_, route)| route).chain(parameterized).map(Route::describe).collect()
    }

    pub fn len(&self) -> usize {
        self.exact_routes.len() + self.parameterized_routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{method} {path}")
}

fn short_type_name<T: ?Sized>() -> String {
    let full_name = std::any::type_name::<T>();
    let without_generics = full_name.split('<').next().unwrap_or(full_name);
    without_generics.rsplit("::").next().unwrap_or(without_generics).to_owned()
}

impl Route {
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path or template this route was registered with
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The compiled template, `None` for exact routes
    pub fn template(&self) -> Option<&str> {
        self.pattern.template()
    }

    pub fn handler(&self) -> &Arc<dyn RequestHandler> {
        &self.handler
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The description, or the handler's type name when none was given
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.handler_name)
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }

    fn template_len(&self) -> usize {
        self.pattern.template().map_or(0, |template| template.chars().count())
    }

    fn describe(&self) -> RouteDescription {
        RouteDescription {
            method: self.method.clone(),
            path: self.path.clone(),
            description: self.description_or_default().to_owned(),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handler", &self.handler_name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<'router> RouteMatch<'router> {
    pub fn route(&self) -> &'router Route {
        self.route
    }

    pub fn handler(&self) -> &'router Arc<dyn RequestHandler> {
        &self.route.handler
    }

    /// Path parameters extracted from the request path; empty for exact routes
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn into_params(self) -> HashMap<String, String> {
        self.params
    }
}

impl fmt::Display for RouteDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} - {}", self.method, self.path, self.description)
    }
}

/// A route under construction: method, handler and optional description
pub struct RouteBuilder {
    method: Method,
    handler: Arc<dyn RequestHandler>,
    handler_name: String,
    description: Option<String>,
}

impl RouteBuilder {
    fn new<H: RequestHandler + 'static>(method: Method, handler: H) -> Self {
        Self { method, handler: Arc::new(handler), handler_name: short_type_name::<H>(), description: None }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Debug for RouteBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBuilder")
            .field("method", &self.method)
            .field("handler", &self.handler_name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

macro_rules! method_route_builder {
    ($method:ident, $method_const:ident) => {
        pub fn $method<H: RequestHandler + 'static>(handler: H) -> RouteBuilder {
            RouteBuilder::new(Method::$method_const, handler)
        }
    };
}

method_route_builder!(get, GET);
method_route_builder!(post, POST);
method_route_builder!(put, PUT);
method_route_builder!(delete, DELETE);
method_route_builder!(patch, PATCH);
method_route_builder!(head, HEAD);
method_route_builder!(options, OPTIONS);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{DefaultNotFoundHandler, handler_fn};
    use crate::request::Request;
    use crate::response::Response;

    fn named(name: &'static str) -> impl RequestHandler + 'static {
        handler_fn(move |_req: &Request| Response::ok(name))
    }

    async fn answer(router: &Router, method: Method, path: &str) -> Option<String> {
        let route_match = router.at(&method, path)?;
        let response = route_match.handler().handle(&Request::new(method, path)).await;
        response.body().as_text().map(str::to_owned)
    }

    #[tokio::test]
    async fn reregistering_replaces_exact_route() {
        let mut router = Router::new();
        router.route("/hello", get(named("first"))).unwrap();
        router.route("/hello", get(named("second"))).unwrap();

        assert_eq!(router.len(), 1);
        assert_eq!(answer(&router, Method::GET, "/hello").await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn exact_routes_are_keyed_by_method() {
        let mut router = Router::new();
        router.route("/items", get(named("list"))).unwrap().route("/items", post(named("create"))).unwrap();

        assert_eq!(answer(&router, Method::GET, "/items").await.as_deref(), Some("list"));
        assert_eq!(answer(&router, Method::POST, "/items").await.as_deref(), Some("create"));
        assert!(router.at(&Method::DELETE, "/items").is_none());
    }

    #[test]
    fn extracts_parameters() {
        let mut router = Router::new();
        router.route("/users/${id}/posts/${postId}", get(named("post"))).unwrap();

        let route_match = router.at(&Method::GET, "/users/123/posts/456").unwrap();

        assert_eq!(route_match.params().len(), 2);
        assert_eq!(route_match.params()["id"], "123");
        assert_eq!(route_match.params()["postId"], "456");
    }

    #[tokio::test]
    async fn exact_beats_parameterized() {
        let mut router = Router::new();
        router.route("/users/${id}", get(named("param"))).unwrap();
        router.route("/users/me", get(named("exact"))).unwrap();

        assert_eq!(answer(&router, Method::GET, "/users/me").await.as_deref(), Some("exact"));
        assert!(router.at(&Method::GET, "/users/me").unwrap().params().is_empty());
        assert_eq!(answer(&router, Method::GET, "/users/42").await.as_deref(), Some("param"));
    }

    #[tokio::test]
    async fn longest_template_wins() {
        let mut router = Router::new();
        router.route("/${a}/${b}", get(named("short"))).unwrap();
        router.route("/files/${name}", get(named("long"))).unwrap();

        assert_eq!(answer(&router, Method::GET, "/files/readme").await.as_deref(), Some("long"));
        assert_eq!(answer(&router, Method::GET, "/other/readme").await.as_deref(), Some("short"));
    }

    #[tokio::test]
    async fn equal_lengths_resolve_to_first_registered() {
        let mut router = Router::new();
        router.route("/x/${aa}", get(named("first"))).unwrap();
        router.route("/x/${bb}", get(named("second"))).unwrap();

        assert_eq!(answer(&router, Method::GET, "/x/1").await.as_deref(), Some("first"));
        assert_eq!(router.at(&Method::GET, "/x/1").unwrap().params()["aa"], "1");
    }

    #[tokio::test]
    async fn parameterized_matching_ignores_method() {
        let mut router = Router::new();
        router.route("/users/${id}", get(named("get-user"))).unwrap();

        assert_eq!(answer(&router, Method::PUT, "/users/123").await.as_deref(), Some("get-user"));
        assert_eq!(answer(&router, Method::DELETE, "/users/123").await.as_deref(), Some("get-user"));
    }

    #[test]
    fn no_match_is_none() {
        let mut router = Router::new();
        router.route("/users/${id}", get(named("user"))).unwrap();

        assert!(router.at(&Method::GET, "/orders/1").is_none());
        assert!(router.at(&Method::GET, "/users/1/extra").is_none());
        assert!(Router::new().at(&Method::GET, "/").is_none());
    }

    #[test]
    fn invalid_template_fails_registration() {
        let mut router = Router::new();

        let error = router.register(Method::GET, "/users/${}", named("x"), None).unwrap_err();

        assert!(matches!(error, PatternError::InvalidPattern { .. }));
        assert!(router.is_empty());
    }

    #[test]
    fn descriptions_fall_back_to_handler_name() {
        let mut router = Router::new();
        router.register(Method::GET, "/missing", DefaultNotFoundHandler, None).unwrap();
        router.route("/", get(named("root")).describe("Home page")).unwrap();

        let descriptions = router.descriptions();

        assert_eq!(descriptions[0].to_string(), "GET / - Home page");
        assert_eq!(descriptions[1].to_string(), "GET /missing - DefaultNotFoundHandler");
    }

    #[test]
    fn descriptions_list_exact_then_longest_templates() {
        let mut router = Router::new();
        router.route("/b", post(named("b"))).unwrap();
        router.route("/a", get(named("a"))).unwrap();
        router.route("/u/${id}", get(named("u")).describe("short")).unwrap();
        router.route("/users/${id}/posts", put(named("p")).describe("long")).unwrap();
        router.route("/x/${id}", delete(named("x")).describe("same length")).unwrap();

        let lines = router.descriptions().iter().map(ToString::to_string).collect::<Vec<_>>();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("GET /a - "));
        assert!(lines[1].starts_with("POST /b - "));
        assert_eq!(lines[2], "PUT /users/${id}/posts - long");
        assert_eq!(lines[3], "GET /u/${id} - short");
        assert_eq!(lines[4], "DELETE /x/${id} - same length");
    }
}
