//! Request head decoder
//!
//! Parses the request line and header lines of one request into a [`RequestHead`].
//! Parsing is line based and lenient: lines may end in LF or CRLF, header lines
//! without a `:` or with an unusable name are skipped, and a repeated header name
//! keeps the last value.
//!
//! # Limits
//!
//! - Maximum head size: 64KB
//!
//! A request line with fewer than two space separated tokens, or whose method is not a
//! valid HTTP token, yields [`ParseError::MalformedRequestLine`] as soon as the line is
//! complete, so the connection can be dropped without reading further.

use bytes::BytesMut;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::query::parse_query;
use crate::protocol::{ParseError, RequestHead};

/// Maximum size in bytes allowed for the request line plus headers
pub(crate) const MAX_HEAD_BYTES: usize = 64 * 1024;

/// Decoder for HTTP request heads implementing the [`Decoder`] trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = RequestHead;
    type Error = ParseError;

    /// Attempts to decode a complete request head from the provided buffer.
    ///
    /// - `Ok(Some(head))` once the terminating blank line has arrived
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` for a malformed request line or an oversized head
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(head_end) = find_head_end(src) {
            trace!(head_size = head_end, "parsed head size");
            ensure!(head_end <= MAX_HEAD_BYTES, ParseError::too_large_head(head_end, MAX_HEAD_BYTES));
            let head_bytes = src.split_to(head_end);
            return parse_head(&head_bytes).map(Some);
        }

        // reject a bad request line before waiting for the headers
        if let Some(line_end) = src.iter().position(|b| *b == b'\n') {
            let line = String::from_utf8_lossy(&src[..line_end]);
            parse_request_line(trim_cr(&line))?;
        }

        ensure!(src.len() <= MAX_HEAD_BYTES, ParseError::too_large_head(src.len(), MAX_HEAD_BYTES));
        Ok(None)
    }
}

/// Parses a head that may lack its terminating blank line, or even the line feed of
/// its request line, because the peer closed its side of the stream.
pub(crate) fn parse_head(bytes: &[u8]) -> Result<RequestHead, ParseError> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.split('\n').map(trim_cr);

    let request_line = lines.next().unwrap_or_default();
    let (method, target) = parse_request_line(request_line)?;

    let (path, query_params) = match target.split_once('?') {
        Some((path, raw_query)) => (path, parse_query(raw_query)),
        None => (target, Default::default()),
    };

    let mut headers = HeaderMap::new();
    for line in lines.take_while(|line| !line.is_empty()) {
        let Some((name, value)) = line.split_once(':') else {
            trace!(line, "skip header line without colon");
            continue;
        };

        match (HeaderName::from_bytes(name.trim().as_bytes()), HeaderValue::from_str(value.trim())) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => trace!(line, "skip invalid header line"),
        }
    }

    Ok(RequestHead::new(method, path).with_headers(headers).with_query_params(query_params))
}

/// Splits the request line on single spaces and returns the method and request target.
///
/// Trailing empty tokens are ignored, so `"GET "` counts as one token.
fn parse_request_line(line: &str) -> Result<(Method, &str), ParseError> {
    let mut tokens = line.split(' ').collect::<Vec<_>>();
    while tokens.last().is_some_and(|token| token.is_empty()) {
        tokens.pop();
    }

    ensure!(tokens.len() >= 2, ParseError::malformed_request_line(line));

    let method = Method::from_bytes(tokens[0].as_bytes()).map_err(|_| ParseError::malformed_request_line(line))?;
    Ok((method, tokens[1]))
}

/// Finds the end offset of the head, just past the first blank line after the request line.
fn find_head_end(src: &[u8]) -> Option<usize> {
    let mut line_start = 0;
    for (i, byte) in src.iter().enumerate() {
        if *byte != b'\n' {
            continue;
        }

        let line = &src[line_start..i];
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() && line_start > 0 {
            return Some(i + 1);
        }
        line_start = i + 1;
    }
    None
}

fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
