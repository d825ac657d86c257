//! Middleware: functions turning one [`RequestHandler`] into another.
//!
//! A [`MiddlewareChain`] keeps its units in registration order and composes them so that
//! the first registered unit is the outermost one. With `[A, B]` around a handler `H`
//! a request runs A-before, B-before, H, B-after, A-after.

mod catch_panic;
mod compression;
mod logging;
mod timing;

pub use catch_panic::CatchPanicMiddleware;
pub use compression::CompressionMiddleware;
pub use logging::LoggingMiddleware;
pub use timing::TimingMiddleware;

use crate::handler::RequestHandler;
use std::fmt;
use std::sync::Arc;

/// Wraps a handler into a new handler.
///
/// The wrapper may run code before and after the inner handler, replace its response or
/// answer without calling it at all.
pub trait Middleware: Send + Sync {
    fn apply(&self, handler: Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler>;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn apply(&self, handler: Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> {
        self.as_ref().apply(handler)
    }
}

/// a closure holder which acts as a [`Middleware`]
#[derive(Copy, Clone)]
pub struct MiddlewareFn<F> {
    f: F,
}

pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: Fn(Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> + Send + Sync,
{
    MiddlewareFn { f }
}

impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> + Send + Sync,
{
    fn apply(&self, handler: Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> {
        (self.f)(handler)
    }
}

impl<F> fmt::Debug for MiddlewareFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareFn").finish_non_exhaustive()
    }
}

/// Middleware units in registration order
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    units: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.units.push(Arc::new(middleware));
        self
    }

    pub fn extend<I, M>(&mut self, middlewares: I) -> &mut Self
    where
        I: IntoIterator<Item = M>,
        M: Middleware + 'static,
    {
        self.units.extend(middlewares.into_iter().map(|m| Arc::new(m) as Arc<dyn Middleware>));
        self
    }

    /// Wraps `handler` so the first registered unit runs outermost
    pub fn compose(&self, handler: Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> {
        self.units.iter().rev().fold(handler, |inner, middleware| middleware.apply(inner))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Middleware for MiddlewareChain {
    fn apply(&self, handler: Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> {
        self.compose(handler)
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain").field("len", &self.units.len()).finish()
    }
}
