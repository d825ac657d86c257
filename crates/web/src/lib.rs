//! Routing, middleware and the server loop of marga
//!
//! ```no_run
//! use marga_web::middleware::LoggingMiddleware;
//! use marga_web::router::{Router, get};
//! use marga_web::{Request, Response, Server, handler_fn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router
//!         .route("/", get(handler_fn(|_req: &Request| Response::ok("hello world"))))?
//!         .route("/users/${id}", get(handler_fn(|req: &Request| {
//!             Response::ok(format!("user {}", req.path_param("id").unwrap_or_default()))
//!         })))?;
//!
//!     Server::builder().router(router).middleware(LoggingMiddleware::new()).build()?.start().await?;
//!     Ok(())
//! }
//! ```

mod body;
mod config;
mod dispatcher;
mod handler;
mod media;
mod request;
mod response;
mod server;

pub mod middleware;
pub mod pattern;
pub mod router;

pub use body::Body;
pub use config::ServerConfig;
pub use dispatcher::Dispatcher;
pub use handler::handler_fn;
pub use handler::DefaultNotFoundHandler;
pub use handler::FnHandler;
pub use handler::RequestHandler;
pub use handler::NOT_FOUND_BODY;
pub use media::MediaType;
pub use media::MediaTypeError;
pub use media::X_RESPONSE_TIME;
pub use request::Request;
pub use response::Response;
pub use server::Server;
pub use server::ServerBuilder;
pub use server::ServerError;
pub use server::ShutdownHandle;
