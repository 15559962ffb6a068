//! flux-dispatch: unidirectional data flow for Rust apps
//!
//! Actions go through one [`Dispatcher`], stores update themselves inside
//! their dispatcher callback, and views re-read stores when notified.
//! Async work runs on tokio tasks whose result actions the [`Runtime`]
//! dispatches back on the owning thread.
//!
//! # Example
//! ```ignore
//! use std::rc::Rc;
//! use flux_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(infer_categories)]
//! enum TodoAction {
//!     TodoCreate(String),
//!     TodoDidSave(u64),
//! }
//!
//! let runtime = Runtime::<TodoAction>::new();
//! let store = ReduceStore::register(runtime.dispatcher(), Vec::new(), |todos: &mut Vec<String>, action| {
//!     match action {
//!         TodoAction::TodoCreate(text) => { todos.push(text.clone()); true }
//!         TodoAction::TodoDidSave(_) => false,
//!     }
//! });
//! let _sub = store.subscribe(|| println!("todos changed"));
//! runtime.context().dispatch(TodoAction::TodoCreate("milk".into()))?;
//! ```

// Re-export everything from core
pub use flux_dispatch_core::*;

// Re-export derive macros
pub use flux_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use flux_dispatch_core::{Action, ActionCategory, ActionSummary, Component, Lifecycle};

    // Dispatcher and stores
    pub use flux_dispatch_core::{
        DispatchError, DispatchToken, Dispatcher, ListenerId, ReduceStore, Reducer, Subscription,
    };

    // Middleware
    pub use flux_dispatch_core::{
        ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware, ComposedMiddleware,
        LoggingMiddleware, Middleware, NoopMiddleware,
    };

    // Runtime
    pub use flux_dispatch_core::{ActionContext, EventKind, EventOutcome, Runtime, TaskKey};

    // Derive macros
    pub use flux_dispatch_macros::Action;

    // Ratatui re-exports
    pub use flux_dispatch_core::{Color, Frame, Line, Modifier, Rect, Span, Style, Text};
}
