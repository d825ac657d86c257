use criterion::{Criterion, criterion_group, criterion_main};
use http::{HeaderMap, Method};
use marga_web::middleware::{LoggingMiddleware, MiddlewareChain, TimingMiddleware};
use marga_web::pattern::PathPattern;
use marga_web::router::{Router, get, post};
use marga_web::{Dispatcher, Request, Response, handler_fn};
use std::collections::HashMap;
use std::hint::black_box;

fn router() -> Router {
    let mut router = Router::new();
    for index in 0..20 {
        router.route(&format!("/static/{index}"), get(handler_fn(|_req: &Request| Response::ok("static")))).unwrap();
    }
    router
        .route("/users/${id}", get(handler_fn(|_req: &Request| Response::ok("user"))))
        .unwrap()
        .route("/users/${id}/posts/${postId}", get(handler_fn(|_req: &Request| Response::ok("post"))))
        .unwrap()
        .route("/orders/${id}", post(handler_fn(|_req: &Request| Response::ok("order"))))
        .unwrap();
    router
}

fn bench_router_at(c: &mut Criterion) {
    let router = router();

    c.bench_function("route_exact", |b| {
        b.iter(|| black_box(router.at(&Method::GET, black_box("/static/10")).is_some()));
    });

    c.bench_function("route_parameterized", |b| {
        b.iter(|| black_box(router.at(&Method::GET, black_box("/users/123/posts/456")).map(|m| m.into_params())));
    });

    c.bench_function("route_miss", |b| {
        b.iter(|| black_box(router.at(&Method::GET, black_box("/nothing/here")).is_none()));
    });
}

fn bench_pattern(c: &mut Criterion) {
    c.bench_function("pattern_compile", |b| {
        b.iter(|| black_box(PathPattern::compile(black_box("/users/${id}/posts/${postId}")).unwrap()));
    });

    let pattern = PathPattern::compile("/users/${id}/posts/${postId}").unwrap();
    c.bench_function("pattern_extract", |b| {
        b.iter(|| black_box(pattern.extract(black_box("/users/123/posts/456"))));
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let mut middleware = MiddlewareChain::new();
    middleware.add(LoggingMiddleware::new()).add(TimingMiddleware::new());
    let dispatcher = Dispatcher::new(router(), middleware);
    let runtime = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("dispatch_parameterized", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(dispatcher.handle(Method::GET, "/users/7", HeaderMap::new(), HashMap::new()).await)
        });
    });
}

criterion_group!(benches, bench_router_at, bench_pattern, bench_dispatch);
criterion_main!(benches);
