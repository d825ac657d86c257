//! The request model handed to handlers and middleware.
//!
//! A [`Request`] is built once per connection from the decoded request head. Path
//! parameters are merged in by the dispatcher after routing; everything else is fixed
//! at construction.

use std::collections::HashMap;

use http::{HeaderMap, Method};
use marga_http::protocol::RequestHead;

/// An HTTP request as seen by the routing layer.
///
/// Accessors return shared borrows, so a handler can never mutate the request it
/// received; cloning a map gives an independent copy.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    path_params: HashMap<String, String>,
    query_params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            path_params: HashMap::new(),
            query_params: HashMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_query_params(mut self, query_params: HashMap<String, String>) -> Self {
        self.query_params = query_params;
        self
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path without its query string
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Looks a header up by name, case-insensitively; `None` when absent or not visible ASCII.
    ///
    /// Values carrying non-ASCII bytes (such as UTF-8 `José`) are kept on the request;
    /// read them with [`Request::header_bytes`].
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Raw bytes of a header value, whatever their encoding.
    pub fn header_bytes(&self, name: &str) -> Option<&[u8]> {
        self.headers.get(name).map(|value| value.as_bytes())
    }

    #[inline]
    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    #[inline]
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub(crate) fn merge_path_params(&mut self, params: HashMap<String, String>) {
        self.path_params.extend(params);
    }
}

impl From<RequestHead> for Request {
    fn from(head: RequestHead) -> Self {
        let (method, path, headers, query_params) = head.into_parts();
        Self { method, path, headers, path_params: HashMap::new(), query_params }
    }
}
