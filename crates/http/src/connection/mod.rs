//! Connection handling for the wire layer
//!
//! [`HttpConnection`] owns both halves of an accepted socket for the lifetime of a
//! single exchange: it decodes one request head, calls the [`Handler`](crate::handler::Handler)
//! and writes one response before closing the write side.

mod http_connection;

pub use http_connection::HttpConnection;
