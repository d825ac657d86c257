//! HTTP codec module for decoding request heads and encoding responses
//!
//! - [`RequestDecoder`]: decodes the request line, query string and headers of one
//!   request; request bodies are never read
//! - [`ResponseEncoder`]: writes the status line, the connection-level headers, any
//!   further response headers and the body bytes
//!
//! Both plug into `tokio_util::codec::{FramedRead, FramedWrite}`.
//!
//! # Example
//!
//! ```no_run
//! use marga_http::codec::{RequestDecoder, ResponseEncoder};
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::{Bytes, BytesMut};
//!
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::from("GET / HTTP/1.1\r\n\r\n");
//! let head = decoder.decode(&mut request_buffer);
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! let _ = encoder.encode(http::Response::new(Bytes::from_static(b"ok")), &mut response_buffer);
//! ```

mod header;
mod request_decoder;
mod response_encoder;

pub use header::{HeaderDecoder, HeaderEncoder};
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
