//! The response model produced by handlers and reshaped by middleware.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use serde::Serialize;

use crate::body::Body;
use crate::media::MediaType;

/// An HTTP response: status, content type, body and any extra headers.
///
/// The content type is kept apart from `headers` and always written by the wire layer;
/// `content-length` and `connection` are managed there too and never need to be set.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    media_type: MediaType,
    body: Body,
    headers: HeaderMap,
}

impl Response {
    pub fn new(status: StatusCode, media_type: MediaType, body: impl Into<Body>) -> Self {
        Self { status, media_type, body: body.into(), headers: HeaderMap::new() }
    }

    fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, MediaType::TEXT_PLAIN, Body::Text(body.into()))
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::text(StatusCode::OK, body)
    }

    pub fn created(body: impl Into<String>) -> Self {
        Self::text(StatusCode::CREATED, body)
    }

    pub fn no_content() -> Self {
        Self::text(StatusCode::NO_CONTENT, "")
    }

    pub fn bad_request(body: impl Into<String>) -> Self {
        Self::text(StatusCode::BAD_REQUEST, body)
    }

    pub fn unauthorized(body: impl Into<String>) -> Self {
        Self::text(StatusCode::UNAUTHORIZED, body)
    }

    pub fn forbidden(body: impl Into<String>) -> Self {
        Self::text(StatusCode::FORBIDDEN, body)
    }

    pub fn not_found(body: impl Into<String>) -> Self {
        Self::text(StatusCode::NOT_FOUND, body)
    }

    pub fn method_not_allowed(body: impl Into<String>) -> Self {
        Self::text(StatusCode::METHOD_NOT_ALLOWED, body)
    }

    pub fn server_error(body: impl Into<String>) -> Self {
        Self::text(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    /// A 200 response carrying already serialized JSON
    pub fn json(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, MediaType::APPLICATION_JSON, Body::Text(body.into()))
    }

    /// A 200 JSON response serialized from `value`
    pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_string(value).map(Self::json)
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, MediaType::TEXT_HTML, Body::Text(body.into()))
    }

    pub fn binary(body: impl Into<Bytes>, media_type: MediaType) -> Self {
        Self::new(StatusCode::OK, media_type, Body::Binary(body.into()))
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a header, replacing any previous value under the same name.
    ///
    /// A `content-type` value updates the media type instead of the header map.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        if name == header::CONTENT_TYPE {
            if let Some(media_type) = value.to_str().ok().and_then(|v| MediaType::new(v).ok()) {
                self.media_type = media_type;
            }
            return self;
        }
        self.headers.insert(name, value);
        self
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        if name.as_ref().eq_ignore_ascii_case(header::CONTENT_TYPE.as_str()) {
            return Some(self.media_type.as_str());
        }
        self.headers.get(name.as_ref()).and_then(|value| value.to_str().ok())
    }
}

impl From<Response> for http::Response<Bytes> {
    fn from(response: Response) -> Self {
        let Response { status, media_type, body, headers } = response;

        let mut http_response = http::Response::new(body.into_bytes());
        *http_response.status_mut() = status;
        *http_response.headers_mut() = headers;

        match HeaderValue::from_str(media_type.as_str()) {
            Ok(content_type) => {
                http_response.headers_mut().insert(header::CONTENT_TYPE, content_type);
            }
            Err(e) => {
                tracing::warn!(cause = %e, media_type = %media_type, "invalid media type, fall back to default");
            }
        }

        http_response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn helpers_set_status_and_media_type() {
        let cases = [
            (Response::ok("a"), StatusCode::OK),
            (Response::created("a"), StatusCode::CREATED),
            (Response::no_content(), StatusCode::NO_CONTENT),
            (Response::bad_request("a"), StatusCode::BAD_REQUEST),
            (Response::unauthorized("a"), StatusCode::UNAUTHORIZED),
            (Response::forbidden("a"), StatusCode::FORBIDDEN),
            (Response::not_found("a"), StatusCode::NOT_FOUND),
            (Response::method_not_allowed("a"), StatusCode::METHOD_NOT_ALLOWED),
            (Response::server_error("a"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (response, status) in cases {
            assert_eq!(response.status(), status);
            assert_eq!(response.media_type(), &MediaType::TEXT_PLAIN);
        }

        assert_eq!(Response::json("{}").media_type(), &MediaType::APPLICATION_JSON);
        assert_eq!(Response::html("<p/>").media_type(), &MediaType::TEXT_HTML);
    }

    #[test]
    fn serializes_values_to_json() {
        #[derive(Serialize)]
        struct User<'a> {
            id: u32,
            name: &'a str,
        }

        let response = Response::to_json(&User { id: 7, name: "ana" }).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_text(), Some(r#"{"id":7,"name":"ana"}"#));
    }

    #[test]
    fn content_type_header_sets_media_type() {
        let response = Response::ok("x")
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static("text/css"))
            .with_header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        assert_eq!(response.media_type(), &MediaType::TEXT_CSS);
        assert_eq!(response.header("Content-Type"), Some("text/css"));
        assert_eq!(response.header("cache-control"), Some("no-cache"));
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn converts_into_wire_response() {
        let response = Response::binary(Bytes::from_static(&[1, 2, 3]), MediaType::IMAGE_PNG)
            .with_status(StatusCode::ACCEPTED)
            .with_header(header::ETAG, HeaderValue::from_static("\"v1\""));

        let http_response: http::Response<Bytes> = response.into();

        assert_eq!(http_response.status(), StatusCode::ACCEPTED);
        assert_eq!(http_response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(http_response.headers()[header::ETAG], "\"v1\"");
        assert_eq!(http_response.body().as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn binary_bodies_stay_binary() {
        let response = Response::binary(vec![0u8, 159, 146, 150], MediaType::APPLICATION_PDF);

        assert!(response.body().is_binary());
        assert_eq!(response.body().len(), 4);
    }
}
