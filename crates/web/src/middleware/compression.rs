//! Response body compression.
//!
//! Encoders write into an in-memory [`Writer`]; the whole text body is compressed at
//! once and kept only when it shrinks below [`MAX_COMPRESSION_RATIO`] of its size.

use crate::body::Body;
use crate::handler::RequestHandler;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};
use http::{HeaderValue, header};
use std::io;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use zstd::stream::write::Encoder as ZstdEncoder;

/// Bodies smaller than this many bytes are sent as-is
pub const DEFAULT_MIN_COMPRESSION_SIZE: usize = 1024;

/// Compressed output must be smaller than this fraction of the original
const MAX_COMPRESSION_RATIO: f64 = 0.9;

const ARCHIVE_MARKERS: [&str; 6] = ["gzip", "deflate", "zip", "7z", "rar", "tar"];

const ZSTD_LEVEL: i32 = 6;
const BROTLI_BUFFER_SIZE: usize = 32 * 1024;
const BROTLI_QUALITY: u32 = 5;
const BROTLI_LGWIN: u32 = 22;

/// Compresses large text responses with the best encoding the client accepts.
///
/// Without an `accept-encoding` request header gzip is used; otherwise the first of
/// zstd, br, gzip and deflate the header names is chosen.
#[derive(Debug, Clone, Copy)]
pub struct CompressionMiddleware {
    min_size: usize,
}

impl CompressionMiddleware {
    pub fn new() -> Self {
        Self { min_size: DEFAULT_MIN_COMPRESSION_SIZE }
    }

    pub fn with_min_size(min_size: usize) -> Self {
        Self { min_size }
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }
}

impl Default for CompressionMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for CompressionMiddleware {
    fn apply(&self, handler: Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> {
        Arc::new(CompressionHandler { inner: handler, min_size: self.min_size })
    }
}

struct CompressionHandler {
    inner: Arc<dyn RequestHandler>,
    min_size: usize,
}

#[async_trait]
impl RequestHandler for CompressionHandler {
    async fn handle(&self, req: &Request) -> Response {
        let response = self.inner.handle(req).await;
        compress(req, response, self.min_size)
    }
}

fn compress(req: &Request, response: Response, min_size: usize) -> Response {
    if !response.status().is_success() || response.headers().contains_key(header::CONTENT_ENCODING) {
        return response;
    }

    let Some(text) = response.body().as_text() else {
        return response;
    };

    let original_size = text.len();
    if original_size == 0 || original_size < min_size || !is_compressible(response.media_type().as_str()) {
        return response;
    }

    let Some(encoding) = ContentEncoding::select(req.header(header::ACCEPT_ENCODING.as_str())) else {
        return response;
    };

    let compressed = match Encoder::new(encoding).and_then(|mut encoder| {
        encoder.write(text.as_bytes())?;
        encoder.finish()
    }) {
        Ok(compressed) => compressed,
        Err(e) => {
            warn!(cause = %e, encoding = encoding.as_str(), "failed to compress response");
            return response;
        }
    };

    #[expect(clippy::cast_precision_loss, reason = "body sizes stay far below 2^52")]
    let ratio = compressed.len() as f64 / original_size as f64;
    if ratio >= MAX_COMPRESSION_RATIO {
        trace!(ratio, "compression gain too small, keep original body");
        return response;
    }

    debug!(
        "Compressed response from {} to {} bytes ({:.1}% reduction)",
        original_size,
        compressed.len(),
        (1.0 - ratio) * 100.0
    );

    response
        .with_body(Body::Binary(compressed))
        .with_header(header::CONTENT_ENCODING, HeaderValue::from_static(encoding.as_str()))
}

fn is_compressible(media_type: &str) -> bool {
    let media_type = media_type.to_ascii_lowercase();

    if ARCHIVE_MARKERS.iter().any(|marker| media_type.contains(marker)) {
        return false;
    }

    if media_type.starts_with("image/") || media_type.starts_with("video/") || media_type.starts_with("audio/") {
        return false;
    }

    media_type.starts_with("text/")
        || media_type.contains("json")
        || media_type.contains("xml")
        || media_type.contains("javascript")
        || media_type.starts_with("application/")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentEncoding {
    Zstd,
    Brotli,
    Gzip,
    Deflate,
}

impl ContentEncoding {
    const PREFERENCE: [ContentEncoding; 4] = [Self::Zstd, Self::Brotli, Self::Gzip, Self::Deflate];

    /// Picks an encoding for the request's `accept-encoding` value.
    ///
    /// An absent header means gzip. Codings listed with `q=0` count as refused.
    fn select(accept_encoding: Option<&str>) -> Option<Self> {
        let Some(accept_encoding) = accept_encoding else {
            return Some(Self::Gzip);
        };

        let accepted = accept_encoding
            .split(',')
            .filter_map(|item| {
                let mut parts = item.split(';').map(str::trim);
                let coding = parts.next().filter(|coding| !coding.is_empty())?;
                let refused = parts.any(|param| {
                    param
                        .strip_prefix("q=")
                        .and_then(|q| q.parse::<f32>().ok())
                        .is_some_and(|q| q <= 0.0)
                });
                (!refused).then(|| coding.to_ascii_lowercase())
            })
            .collect::<Vec<_>>();

        Self::PREFERENCE.into_iter().find(|encoding| accepted.iter().any(|coding| coding == encoding.as_str()))
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Zstd => "zstd",
            Self::Brotli => "br",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }
}

// inspired by from actix-http
struct Writer {
    buf: BytesMut,
}

impl Writer {
    fn new() -> Self {
        Self { buf: BytesMut::with_capacity(4096) }
    }

    fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

enum Encoder {
    Gzip(GzEncoder<Writer>),
    Deflate(ZlibEncoder<Writer>),
    Zstd(ZstdEncoder<'static, Writer>),
    Br(Box<brotli::CompressorWriter<Writer>>),
}

impl Encoder {
    fn new(encoding: ContentEncoding) -> io::Result<Self> {
        Ok(match encoding {
            ContentEncoding::Gzip => Self::Gzip(GzEncoder::new(Writer::new(), Compression::default())),
            ContentEncoding::Deflate => Self::Deflate(ZlibEncoder::new(Writer::new(), Compression::default())),
            ContentEncoding::Zstd => Self::Zstd(ZstdEncoder::new(Writer::new(), ZSTD_LEVEL)?),
            ContentEncoding::Brotli => Self::Br(Box::new(brotli::CompressorWriter::new(
                Writer::new(),
                BROTLI_BUFFER_SIZE,
                BROTLI_QUALITY,
                BROTLI_LGWIN,
            ))),
        })
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        match self {
            Self::Gzip(encoder) => encoder.write_all(data),
            Self::Deflate(encoder) => encoder.write_all(data),
            Self::Zstd(encoder) => encoder.write_all(data),
            Self::Br(encoder) => encoder.write_all(data),
        }
    }

    fn finish(self) -> io::Result<Bytes> {
        match self {
            Self::Gzip(encoder) => encoder.finish().map(Writer::freeze),
            Self::Deflate(encoder) => encoder.finish().map(Writer::freeze),
            Self::Zstd(encoder) => encoder.finish().map(Writer::freeze),
            Self::Br(mut encoder) => {
                encoder.flush()?;
                Ok(encoder.into_inner().freeze())
            }
        }
    }
}
