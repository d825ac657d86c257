//! HTTP request decoder module
//!
//! Wraps [`HeaderDecoder`] and adds end-of-stream handling: when the peer closes its
//! side before sending the blank line that ends the head, whatever arrived is still
//! parsed as a request, matching a reader that treats end of stream as the end of the
//! header section.
//!
//! # Example
//!
//! ```no_run
//! use marga_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /hello HTTP/1.1\r\n\r\n");
//! let head = decoder.decode(&mut buffer);
//! ```

use crate::codec::header::{HeaderDecoder, parse_head};
use crate::protocol::{ParseError, RequestHead};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

/// A decoder for the head of one HTTP request; request bodies are never decoded.
#[derive(Debug, Default)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for RequestDecoder {
    type Item = RequestHead;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.header_decoder.decode(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(head) = self.decode(src)? {
            return Ok(Some(head));
        }

        if src.is_empty() {
            return Ok(None);
        }

        trace!(remaining = src.len(), "stream closed inside request head, parse what arrived");
        let head_bytes = src.split();
        parse_head(&head_bytes).map(Some)
    }
}
