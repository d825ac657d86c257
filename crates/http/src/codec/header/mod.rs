//! Request head decoding and response head encoding
//!
//! - [`HeaderDecoder`]: parses the request line, query string and header lines
//! - [`HeaderEncoder`]: writes the status line and response headers

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub(crate) use header_decoder::parse_head;
pub use header_encoder::HeaderEncoder;
