//! Response head encoder
//!
//! Serializes the status line and headers of a response. The encoder owns the
//! connection-level headers: `content-type` always carries a UTF-8 charset suffix,
//! `content-length` is the byte length handed in with the head and `connection` is
//! always `close`. Any other response header follows them unchanged.

use crate::protocol::{ResponseHead, SendError};

use bytes::{BufMut, BytesMut};

use http::header;
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Media type used when a response carries no `content-type`
const DEFAULT_MEDIA_TYPE: &str = "text/plain";

const CHARSET_SUFFIX: &str = "; charset=UTF-8";

/// Encoder for HTTP response heads implementing the [`Encoder`] trait.
///
/// The item is the response head plus the byte length of the body that follows.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderEncoder;

impl Encoder<(ResponseHead, usize)> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (ResponseHead, usize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (header, content_length) = item;

        dst.reserve(INIT_HEADER_SIZE);
        write!(
            FastWrite(dst),
            "HTTP/1.1 {} {}\r\n",
            header.status().as_str(),
            header.status().canonical_reason().unwrap_or_default()
        )?;

        let media_type = header.headers().get(header::CONTENT_TYPE).map_or(DEFAULT_MEDIA_TYPE.as_bytes(), |value| value.as_bytes());
        dst.put_slice(b"content-type: ");
        dst.put_slice(media_type);
        if !contains_charset(media_type) {
            dst.put_slice(CHARSET_SUFFIX.as_bytes());
        }
        dst.put_slice(b"\r\n");

        write!(FastWrite(dst), "content-length: {content_length}\r\n")?;
        dst.put_slice(b"connection: close\r\n");

        for (header_name, header_value) in header.headers() {
            if header_name == header::CONTENT_TYPE || header_name == header::CONTENT_LENGTH || header_name == header::CONNECTION {
                continue;
            }
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

fn contains_charset(media_type: &[u8]) -> bool {
    media_type.windows(b"charset=".len()).any(|window| window.eq_ignore_ascii_case(b"charset="))
}

/// Fast writer implementation for writing to BytesMut.
///
/// Avoids bounds checking when writing to the bytes buffer, since enough space
/// has already been reserved.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
