//! The wire layer of marga: a deliberately small HTTP/1.1 server core
//!
//! This crate turns one accepted socket into exactly one parsed request head and one
//! serialized response, then closes the connection. It is built on top of tokio and
//! `tokio-util` codecs, and leaves routing and middleware to `marga-web`.
//!
//! # Features
//!
//! - Lenient request-line and header parsing (LF or CRLF line endings)
//! - Query-string parsing with percent-decoding that never fails the request
//! - Response serialization with a byte-exact `Content-Length`
//! - One request per connection, `Connection: close` on every response
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::{Response, StatusCode};
//! use marga_http::connection::HttpConnection;
//! use marga_http::handler::make_handler;
//! use marga_http::protocol::RequestHead;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             if let Err(e) = connection.process(handler).await {
//!                 error!("connection failed, cause {}", e);
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(head: RequestHead) -> Response<Bytes> {
//!     info!(path = head.path(), "receive request");
//!     Response::builder()
//!         .status(StatusCode::OK)
//!         .header(http::header::CONTENT_TYPE, "text/plain; charset=UTF-8")
//!         .body(Bytes::from_static(b"Hello World!"))
//!         .unwrap()
//! }
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: drives one request/response exchange over a socket
//! - [`protocol`]: the request head, query parsing and error types
//! - [`codec`]: `tokio-util` decoder and encoder for the wire format
//! - [`handler`]: the seam between the wire layer and the application
//!
//! # Limitations
//!
//! - No keep-alive, pipelining or chunked transfer encoding
//! - Request bodies are never read
//! - Maximum request head size: 64KB
//! - No read or write timeouts

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
