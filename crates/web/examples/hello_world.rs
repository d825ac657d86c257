use async_trait::async_trait;
use marga_web::middleware::{CatchPanicMiddleware, CompressionMiddleware, LoggingMiddleware, TimingMiddleware};
use marga_web::router::{Router, get};
use marga_web::{MediaType, Request, RequestHandler, Response, Server, handler_fn};
use serde::Serialize;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

struct GreetHandler;

#[async_trait]
impl RequestHandler for GreetHandler {
    async fn handle(&self, req: &Request) -> Response {
        let greeting = match req.path_param("name") {
            Some(name) => format!("Hello, {name}!"),
            None => "Hello, stranger!".to_owned(),
        };

        Response::html(format!(
            "<html><body><h1>Greetings!</h1><p>{greeting}</p><p>Method: {}</p><p>Path: {}</p><a href='/'>Back</a></body></html>",
            req.method(),
            req.path()
        ))
    }
}

#[derive(Serialize)]
struct ApiInfo<'a> {
    method: &'a str,
    path: &'a str,
    query: Vec<(&'a str, &'a str)>,
}

fn api_info(req: &Request) -> Response {
    let info = ApiInfo {
        method: req.method().as_str(),
        path: req.path(),
        query: req.query_params().iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
    };

    Response::to_json(&info).unwrap_or_else(|e| Response::server_error(e.to_string()))
}

fn routes() -> Result<Router, marga_web::pattern::PatternError> {
    let mut router = Router::new();
    router
        .route("/", get(handler_fn(|_req: &Request| Response::ok("hello world"))).describe("Root page"))?
        .route("/hello", get(handler_fn(|_req: &Request| Response::ok("Hello, World!"))).describe("Greeting"))?
        .route("/api", get(handler_fn(api_info)).describe("API information"))?
        .route("/greet", get(GreetHandler).describe("Greet endpoint"))?
        .route("/greet/${name}", get(GreetHandler).describe("Greet with name parameter"))?
        .route("/logo.svg", get(handler_fn(|_req: &Request| {
            Response::ok("<svg xmlns='http://www.w3.org/2000/svg'/>").with_media_type(MediaType::IMAGE_SVG)
        })))?;
    Ok(router)
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = match routes() {
        Ok(router) => router,
        Err(e) => {
            error!(cause = %e, "invalid route");
            return;
        }
    };

    let server = Server::builder()
        .router(router)
        .address("127.0.0.1", 8080)
        .middleware(LoggingMiddleware::new())
        .middleware(CatchPanicMiddleware::new())
        .middleware(TimingMiddleware::new())
        .middleware(CompressionMiddleware::new())
        .build()
        .expect("router is set");

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.stop();
        }
    });

    if let Err(e) = server.start().await {
        error!(cause = %e, "server stopped with error");
    }
}
