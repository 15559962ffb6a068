//! Middleware hooks around dispatcher payload delivery

use crate::Action;

/// Middleware trait for observing dispatched actions
///
/// Implement this trait to add logging, recording, or other
/// cross-cutting concerns to a [`Dispatcher`](crate::Dispatcher).
/// Hooks only run for dispatches that were accepted; a rejected
/// reentrant dispatch never reaches middleware. The hooks themselves run
/// inside the dispatch, so dispatching from them is rejected too.
pub trait Middleware<A: Action> {
    /// Called before the payload is delivered to any callback
    fn before(&mut self, action: &A);

    /// Called after every callback has seen the payload
    fn after(&mut self, action: &A, invoked: usize);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _invoked: usize) {}
}

/// Middleware that logs actions through `tracing`
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before delivery
    pub log_before: bool,
    /// Whether to log after delivery
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default settings (log after only)
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    /// Create a logging middleware that logs both before and after
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl<A: Action> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, action: &A) {
        if self.log_before {
            tracing::debug!(action = %action.name(), "Dispatching action");
        }
    }

    fn after(&mut self, action: &A, invoked: usize) {
        if self.log_after {
            tracing::debug!(action = %action.name(), callbacks = invoked, "Action delivered");
        }
    }
}

/// Compose multiple middleware into a single middleware
pub struct ComposedMiddleware<A: Action> {
    middlewares: Vec<Box<dyn Middleware<A>>>,
}

impl<A: Action> std::fmt::Debug for ComposedMiddleware<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("middlewares_count", &self.middlewares.len())
            .finish()
    }
}

impl<A: Action> Default for ComposedMiddleware<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ComposedMiddleware<A> {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the composition
    pub fn add<M: Middleware<A> + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Builder form of [`add`](Self::add)
    pub fn with<M: Middleware<A> + 'static>(mut self, middleware: M) -> Self {
        self.add(middleware);
        self
    }
}

impl<A: Action> Middleware<A> for ComposedMiddleware<A> {
    fn before(&mut self, action: &A) {
        for middleware in &mut self.middlewares {
            middleware.before(action);
        }
    }

    fn after(&mut self, action: &A, invoked: usize) {
        // Reverse order so hooks nest
        for middleware in self.middlewares.iter_mut().rev() {
            middleware.after(action, invoked);
        }
    }
}
