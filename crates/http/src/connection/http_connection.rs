use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::HttpError;

/// Initial capacity of the read buffer
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// An HTTP connection serving exactly one request
///
/// `HttpConnection` reads one request head, hands it to the handler, writes the single
/// response and shuts the write side down. There is no keep-alive and no timeout: a
/// peer that never finishes its head keeps the connection waiting.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), READ_BUFFER_SIZE),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    /// Runs the exchange: parse, then dispatch, then serialize.
    ///
    /// A malformed request line or a peer closing before sending anything ends the
    /// exchange with `Ok(())` and nothing written.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        let head = match self.framed_read.next().await {
            Some(Ok(head)) => head,

            Some(Err(e)) if e.is_silent() => {
                debug!(cause = %e, "drop connection without response");
                return Ok(());
            }

            Some(Err(e)) => return Err(e.into()),

            None => {
                info!("cant read request line, break this connection down");
                return Ok(());
            }
        };

        let response = handler.call(head).await;

        // send flushes the underlying io
        self.framed_write.send(response).await?;

        if let Err(e) = self.framed_write.get_mut().shutdown().await {
            debug!(cause = %e, "shutdown connection error");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::RequestHead;
    use bytes::Bytes;
    use http::{Response, StatusCode};
    use tokio::io::AsyncReadExt;

    async fn exchange(raw_request: &[u8]) -> (Result<(), HttpError>, String) {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);
        let connection = HttpConnection::new(reader, writer);

        let handler = Arc::new(make_handler(|head: RequestHead| async move {
            let name = head.query_params().get("name").cloned().unwrap_or_default();
            Response::builder()
                .status(StatusCode::OK)
                .body(Bytes::from(format!("{} {} {}", head.method(), head.path(), name)))
                .unwrap()
        }));

        client.write_all(raw_request).await.unwrap();
        client.shutdown().await.unwrap();

        let mut output = String::new();
        let (result, read) = tokio::join!(connection.process(handler), client.read_to_string(&mut output));
        read.unwrap();
        (result, output)
    }

    #[tokio::test]
    async fn one_request_one_response() {
        let (result, output) = exchange(b"GET /greet?name=john%20doe HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

        result.unwrap();
        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.contains("connection: close\r\n"));
        assert!(output.ends_with("\r\n\r\nGET /greet john doe"));
    }

    #[tokio::test]
    async fn malformed_request_line_gets_no_response() {
        let (result, output) = exchange(b"GARBAGE\r\n\r\n").await;

        result.unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn empty_stream_gets_no_response() {
        let (result, output) = exchange(b"").await;

        result.unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn head_cut_by_eof_is_still_served() {
        let (result, output) = exchange(b"GET /partial HTTP/1.1\r\nHost: localhost\r\n").await;

        result.unwrap();
        assert!(output.ends_with("GET /partial "));
    }
}
