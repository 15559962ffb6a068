//! Core traits and types for flux-dispatch
//!
//! This crate provides the building blocks for applications with
//! unidirectional data flow: actions go through a single dispatcher into
//! stores, stores tell subscribed views that they changed, and views read
//! the new state.
//!
//! # Core Concepts
//!
//! - **Action**: A payload describing an intent or an outcome
//! - **Dispatcher**: Delivers each action to every registered callback, in order
//! - **Store**: Owns a slice of state, updated by a reducer inside its callback
//! - **Subscription**: RAII handle for a store change listener
//! - **Runtime**: Feeds results of async tasks back into the dispatcher
//! - **Component**: UI element that reads stores and renders
//!
//! # Basic Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use flux_dispatch_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! #[derive(Default)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! fn reducer(state: &mut CounterState, action: &CounterAction) -> bool {
//!     match action {
//!         CounterAction::Increment => { state.count += 1; true }
//!     }
//! }
//!
//! let dispatcher = Rc::new(Dispatcher::new());
//! let store = ReduceStore::register(&dispatcher, CounterState::default(), reducer);
//! let _sub = store.subscribe(|| println!("changed"));
//! dispatcher.dispatch(CounterAction::Increment)?;
//! ```
//!
//! # Async Action Creators
//!
//! Action creators that talk to the network use a two-phase pattern:
//!
//! 1. an **intent action** is dispatched synchronously (`ImagesLoad`)
//! 2. a task does the work and its **result action** (`ImagesDidLoad`,
//!    `ImagesDidFail`) is dispatched by the [`Runtime`] once it completes
//!
//! ```ignore
//! fn load_images(ctx: &ActionContext<ImageAction>, source: Arc<impl ImageSource>) -> Result<TaskKey, DispatchError> {
//!     ctx.dispatch(ImageAction::ImagesLoad)?;
//!     Ok(ctx.spawn_anonymous("images", async move {
//!         match source.fetch_images().await {
//!             Ok(images) => ImageAction::ImagesDidLoad(images),
//!             Err(e) => ImageAction::ImagesDidFail(e),
//!         }
//!     }))
//! }
//! ```
//!
//! The `Did*` naming convention marks result actions. With
//! `#[action(infer_categories)]` both phases share a category (`"images"`).

pub mod action;
pub mod action_log;
pub mod component;
pub mod dispatcher;
pub mod emitter;
pub mod event;
pub mod middleware;
pub mod runtime;
pub mod store;
pub mod tasks;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionCategory, ActionSummary};
pub use component::{Component, Lifecycle};

// Dispatcher and store exports
pub use dispatcher::{DispatchError, DispatchToken, Dispatcher};
pub use emitter::{ChangeEmitter, ListenerId, Subscription};
pub use store::{ReduceStore, Reducer};

// Middleware exports
pub use action_log::{
    glob_match, ActionLog, ActionLogConfig, ActionLogEntry, ActionLoggerConfig,
    ActionLoggerMiddleware, SharedActionLog,
};
pub use middleware::{ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware};

// Runtime and task exports
pub use runtime::{ActionContext, EventOutcome, PollerConfig, Runtime};
pub use tasks::{TaskKey, TaskManager};

// Event exports
pub use event::{process_raw_event, spawn_event_poller, EventKind, RawEvent};

// Re-export ratatui types for convenience
pub use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    Frame,
};

// Testing exports
pub use testing::{
    buffer_to_string_plain, char_key, key, key_event, ActionRecorder, RenderHarness, TestHarness,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionCategory, ActionSummary};
    pub use crate::component::{Component, Lifecycle};
    pub use crate::dispatcher::{DispatchError, DispatchToken, Dispatcher};
    pub use crate::emitter::{ListenerId, Subscription};
    pub use crate::event::EventKind;
    pub use crate::middleware::{ComposedMiddleware, LoggingMiddleware, Middleware};
    pub use crate::runtime::{ActionContext, EventOutcome, Runtime};
    pub use crate::store::{ReduceStore, Reducer};
    pub use crate::tasks::TaskKey;

    // Re-export ratatui types
    pub use ratatui::{
        layout::Rect,
        style::{Color, Modifier, Style},
        text::{Line, Span, Text},
        Frame,
    };
}
