use crate::codec::header::HeaderEncoder;
use crate::protocol::{ResponseHead, SendError};
use bytes::{Bytes, BytesMut};
use http::Response;
use tokio_util::codec::Encoder;

/// Encodes a complete response: the head through [`HeaderEncoder`], then the body bytes
/// as-is. The `content-length` written is always the body's byte length.
#[derive(Debug, Default)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder<Response<Bytes>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Response<Bytes>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (parts, body) = item.into_parts();
        self.header_encoder.encode((ResponseHead::from_parts(parts, ()), body.len()), dst)?;
        dst.extend_from_slice(&body);
        Ok(())
    }
}
