//! The parsed head of one HTTP request.

use std::collections::HashMap;

use http::{HeaderMap, Method};

/// Represents everything the wire layer reads from a request.
///
/// The request target is split into the `path` (without query string) and the decoded
/// query parameters. Header names are case-insensitive and single-valued: a repeated
/// name keeps the last value seen on the wire.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    path: String,
    headers: HeaderMap,
    query_params: HashMap<String, String>,
}

impl RequestHead {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), headers: HeaderMap::new(), query_params: HashMap::new() }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_query_params(mut self, query_params: HashMap<String, String>) -> Self {
        self.query_params = query_params;
        self
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the decoded query parameters.
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Consumes the head, returning method, path, headers and query parameters.
    pub fn into_parts(self) -> (Method, String, HeaderMap, HashMap<String, String>) {
        (self.method, self.path, self.headers, self.query_params)
    }
}
