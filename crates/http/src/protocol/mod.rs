//! Core protocol types of the wire layer.
//!
//! - [`RequestHead`]: the parsed request line, headers and query string of one request
//! - [`query`]: query-string parsing and lenient percent-decoding
//! - [`ResponseHead`]: a response before its body is attached
//! - Error handling ([`HttpError`], [`ParseError`], [`SendError`])
//!
//! Responses travel as plain `http::Response<Bytes>`; the encoder derives the
//! `Content-Length` and `Connection` headers itself.

mod request;
pub use request::RequestHead;

mod response;
pub use response::ResponseHead;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

pub mod query;
