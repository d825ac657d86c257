//! Server assembly and the accept loop.
//!
//! A [`Server`] is built once from a [`Router`], a middleware chain and an optional
//! not-found handler. Serving spawns one tokio task per accepted connection; each task
//! handles exactly one request. [`ShutdownHandle::stop`] ends the accept loop while
//! connection tasks already running finish on their own.

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::handler::RequestHandler;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::router::Router;
use marga_http::connection::HttpConnection;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct ServerBuilder {
    router: Option<Router>,
    middleware: MiddlewareChain,
    not_found_handler: Option<Arc<dyn RequestHandler>>,
    config: ServerConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, middleware: MiddlewareChain::new(), not_found_handler: None, config: ServerConfig::default() }
    }

    pub fn address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config = ServerConfig::new(host, port);
        self
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Appends a middleware unit; the first one added runs outermost
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.add(middleware);
        self
    }

    pub fn not_found_handler(mut self, request_handler: impl RequestHandler + 'static) -> Self {
        self.not_found_handler = Some(Arc::new(request_handler));
        self
    }

    pub fn build(self) -> Result<Server, ServerError> {
        let router = self.router.ok_or(ServerError::MissingRouter)?;

        let mut dispatcher = Dispatcher::new(router, self.middleware);
        if let Some(not_found_handler) = self.not_found_handler {
            dispatcher = dispatcher.with_not_found_handler(not_found_handler);
        }

        Ok(Server { dispatcher: Arc::new(dispatcher), config: self.config, shutdown: CancellationToken::new() })
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("router", &self.router)
            .field("middleware", &self.middleware)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Server {
    dispatcher: Arc<Dispatcher>,
    config: ServerConfig,
    shutdown: CancellationToken,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("router must be set")]
    MissingRouter,
    #[error("can't resolve address {address}: {source}")]
    InvalidAddress { address: String, source: io::Error },
    #[error("can't bind {address}: {source}")]
    Bind { address: String, source: io::Error },
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

/// Stops the accept loop of the [`Server`] it was taken from
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    token: CancellationToken,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle { token: self.shutdown.clone() }
    }

    /// Resolves and binds the configured address, logs the route listing, then serves
    /// until stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let address = self.config.to_string();
        let socket_addrs = tokio::net::lookup_host((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|source| ServerError::InvalidAddress { address: address.clone(), source })?
            .collect::<Vec<SocketAddr>>();

        let tcp_listener = TcpListener::bind(socket_addrs.as_slice()).await.map_err(|source| {
            error!(cause = %source, "bind server error");
            ServerError::Bind { address, source }
        })?;

        info!("HTTP Server running on {}", self.config.server_url());
        self.log_routes();

        self.serve(tcp_listener).await
    }

    fn log_routes(&self) {
        info!("Application Routes:");
        for description in self.dispatcher.router().descriptions() {
            info!("  {}", description);
        }
    }

    /// Serves connections from an already bound listener until stopped
    pub async fn serve(self, tcp_listener: TcpListener) -> Result<(), ServerError> {
        info!("start listening at {}", tcp_listener.local_addr()?);

        let handler = self.dispatcher;
        loop {
            let (tcp_stream, remote_addr) = tokio::select! {
                () = self.shutdown.cancelled() => {
                    info!("shutdown requested, stop accepting connections");
                    return Ok(());
                }
                accepted = tcp_listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            let handler = Arc::clone(&handler);

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::new(reader, writer);
                match connection.process(handler).await {
                    Ok(()) => {
                        debug!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(cause = %e, %remote_addr, "service has error, connection shutdown");
                    }
                }
            });
        }
    }
}
