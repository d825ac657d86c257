//! Content types and the extra header names used by the framework.
//!
//! Status codes come straight from [`http::StatusCode`] and standard header names from
//! [`http::header`]; this module only adds what those crates do not carry.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use http::HeaderName;
use thiserror::Error;

/// Header carrying the handler time recorded by [`TimingMiddleware`](crate::middleware::TimingMiddleware).
pub const X_RESPONSE_TIME: HeaderName = HeaderName::from_static("x-response-time");

/// An immutable, trimmed, non-empty content type such as `text/html`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType(Cow<'static, str>);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MediaTypeError {
    #[error("media type value cannot be empty")]
    Empty,
}

impl MediaType {
    pub const TEXT_PLAIN: MediaType = MediaType::from_static("text/plain");
    pub const TEXT_HTML: MediaType = MediaType::from_static("text/html");
    pub const TEXT_CSS: MediaType = MediaType::from_static("text/css");
    pub const TEXT_JAVASCRIPT: MediaType = MediaType::from_static("text/javascript");
    pub const APPLICATION_JSON: MediaType = MediaType::from_static("application/json");
    pub const APPLICATION_XML: MediaType = MediaType::from_static("application/xml");
    pub const APPLICATION_PDF: MediaType = MediaType::from_static("application/pdf");
    pub const IMAGE_JPEG: MediaType = MediaType::from_static("image/jpeg");
    pub const IMAGE_PNG: MediaType = MediaType::from_static("image/png");
    pub const IMAGE_GIF: MediaType = MediaType::from_static("image/gif");
    pub const IMAGE_SVG: MediaType = MediaType::from_static("image/svg+xml");

    const fn from_static(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    /// Creates a media type from any string, trimming surrounding whitespace.
    pub fn new(value: impl AsRef<str>) -> Result<Self, MediaTypeError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MediaTypeError::Empty);
        }
        Ok(Self(Cow::Owned(trimmed.to_owned())))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the value into a [`mime::Mime`], `None` when it is not a valid mime.
    pub fn mime(&self) -> Option<mime::Mime> {
        self.0.parse().ok()
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self::TEXT_PLAIN
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<mime::Mime> for MediaType {
    fn from(mime: mime::Mime) -> Self {
        Self(Cow::Owned(mime.as_ref().to_owned()))
    }
}

impl AsRef<str> for MediaType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
