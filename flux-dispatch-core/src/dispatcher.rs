//! Synchronous dispatcher routing actions to registered store callbacks
//!
//! The dispatcher is the only way data enters the stores. Each call to
//! [`Dispatcher::dispatch`] delivers one payload to every registered
//! callback, in registration order, before returning. Dispatches never
//! nest: a callback that tries to dispatch gets
//! [`DispatchError::Reentrant`] back while the outer dispatch carries on.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use flux_dispatch::{Action, Dispatcher};
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     TodoCreate(String),
//! }
//!
//! let dispatcher = Rc::new(Dispatcher::new());
//! let token = dispatcher.register(|action: &TodoAction| {
//!     println!("got {:?}", action);
//! });
//!
//! dispatcher.dispatch(TodoAction::TodoCreate("milk".into()))?;
//! dispatcher.unregister(token);
//! ```
//!
//! # Ordering between stores
//!
//! A callback can require other callbacks to see the current payload
//! first with [`Dispatcher::wait_for`]:
//!
//! ```ignore
//! let totals_token = dispatcher.register(move |action| {
//!     dispatcher_handle.wait_for(&[items_token]).ok();
//!     // items store is up to date here
//! });
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::middleware::{Middleware, NoopMiddleware};
use crate::Action;

/// Handle returned by [`Dispatcher::register`]
///
/// Used to unregister a callback or to name it in [`Dispatcher::wait_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatchToken(u64);

impl DispatchToken {
    /// Numeric id, unique per dispatcher
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DispatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID_{}", self.0)
    }
}

/// Errors raised by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// `dispatch` was called while another dispatch was running.
    Reentrant {
        rejected: &'static str,
        in_progress: &'static str,
    },
    /// `wait_for` was called outside of a dispatch.
    NotDispatching,
    /// `wait_for` named a token that is not registered.
    UnknownToken(DispatchToken),
    /// `wait_for` named a callback that is itself waiting.
    CircularDependency(DispatchToken),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Reentrant {
                rejected,
                in_progress,
            } => write!(
                f,
                "cannot dispatch {} in the middle of dispatching {}",
                rejected, in_progress
            ),
            DispatchError::NotDispatching => {
                write!(f, "wait_for must be invoked while dispatching")
            }
            DispatchError::UnknownToken(token) => {
                write!(f, "{} does not map to a registered callback", token)
            }
            DispatchError::CircularDependency(token) => {
                write!(f, "circular dependency detected while waiting for {}", token)
            }
        }
    }
}

impl std::error::Error for DispatchError {}

type Callback<A> = Rc<RefCell<dyn FnMut(&A)>>;

struct Registration<A> {
    token: DispatchToken,
    callback: Callback<A>,
}

/// Bookkeeping for the payload currently being delivered
struct InFlight<A> {
    payload: Rc<A>,
    pending: HashSet<DispatchToken>,
    handled: HashSet<DispatchToken>,
}

/// Clears the in-flight slot even if a callback panics
struct InFlightGuard<'a, A> {
    slot: &'a RefCell<Option<InFlight<A>>>,
}

impl<A> Drop for InFlightGuard<'_, A> {
    fn drop(&mut self) {
        self.slot.borrow_mut().take();
    }
}

/// Central synchronous router from actions to store callbacks
///
/// The dispatcher is single-threaded: it lives behind an `Rc` and is shared
/// by the stores that register with it and the action creators that push
/// payloads into it. Async work hands its results back through
/// [`Runtime`](crate::Runtime), which dispatches them on this thread.
pub struct Dispatcher<A: Action> {
    callbacks: RefCell<Vec<Registration<A>>>,
    next_token: Cell<u64>,
    in_flight: RefCell<Option<InFlight<A>>>,
    middleware: RefCell<Box<dyn Middleware<A>>>,
    /// Middleware set while a dispatch was running
    next_middleware: RefCell<Option<Box<dyn Middleware<A>>>>,
}

impl<A: Action> Default for Dispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("callbacks", &self.len())
            .field("dispatching", &self.is_dispatching())
            .finish()
    }
}

impl<A: Action> Dispatcher<A> {
    /// Create a dispatcher with no callbacks and no middleware
    pub fn new() -> Self {
        Self::with_middleware(NoopMiddleware)
    }

    /// Create a dispatcher whose dispatches run through `middleware`
    pub fn with_middleware<M: Middleware<A> + 'static>(middleware: M) -> Self {
        Self {
            callbacks: RefCell::new(Vec::new()),
            next_token: Cell::new(1),
            in_flight: RefCell::new(None),
            middleware: RefCell::new(Box::new(middleware)),
            next_middleware: RefCell::new(None),
        }
    }

    /// Replace the middleware
    ///
    /// Called during a dispatch, the new middleware takes over once that
    /// dispatch has finished.
    pub fn set_middleware<M: Middleware<A> + 'static>(&self, middleware: M) {
        let middleware: Box<dyn Middleware<A>> = Box::new(middleware);
        if self.is_dispatching() {
            *self.next_middleware.borrow_mut() = Some(middleware);
        } else {
            *self.middleware.borrow_mut() = middleware;
        }
    }

    /// Register a callback to be invoked with every dispatched payload
    pub fn register<F>(&self, callback: F) -> DispatchToken
    where
        F: FnMut(&A) + 'static,
    {
        let token = DispatchToken(self.next_token.get());
        self.next_token.set(token.0 + 1);

        let callback: Callback<A> = Rc::new(RefCell::new(callback));
        self.callbacks
            .borrow_mut()
            .push(Registration { token, callback });

        tracing::trace!(%token, "Registered dispatcher callback");
        token
    }

    /// Remove a callback. Returns `false` if the token was not registered.
    pub fn unregister(&self, token: DispatchToken) -> bool {
        // Drop the callback only after the borrow is released; it may own
        // a store whose own Drop unregisters.
        let removed = {
            let mut callbacks = self.callbacks.borrow_mut();
            callbacks
                .iter()
                .position(|registration| registration.token == token)
                .map(|index| callbacks.remove(index))
        };

        match removed {
            Some(_) => {
                tracing::trace!(%token, "Unregistered dispatcher callback");
                true
            }
            None => false,
        }
    }

    /// Whether `token` currently maps to a callback
    pub fn is_registered(&self, token: DispatchToken) -> bool {
        self.callbacks
            .borrow()
            .iter()
            .any(|registration| registration.token == token)
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Whether no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }

    /// Whether a dispatch is currently in progress
    pub fn is_dispatching(&self) -> bool {
        self.in_flight.borrow().is_some()
    }

    /// Deliver `action` to every registered callback, in registration order
    ///
    /// Returns the number of callbacks that saw the payload. Callbacks
    /// registered while this dispatch runs are first invoked by the next
    /// one; callbacks unregistered mid-dispatch are skipped. The dispatch
    /// counts as in progress from the middleware's `before` hook through
    /// its `after` hook.
    pub fn dispatch(&self, action: A) -> Result<usize, DispatchError> {
        self.check_not_dispatching(&action)?;

        self.swap_in_next_middleware();

        let payload = Rc::new(action);
        *self.in_flight.borrow_mut() = Some(InFlight {
            payload: payload.clone(),
            pending: HashSet::new(),
            handled: HashSet::new(),
        });

        let invoked = {
            let _guard = InFlightGuard {
                slot: &self.in_flight,
            };

            self.middleware.borrow_mut().before(&payload);

            let snapshot: Vec<(DispatchToken, Callback<A>)> = self
                .callbacks
                .borrow()
                .iter()
                .map(|registration| (registration.token, registration.callback.clone()))
                .collect();

            for (token, callback) in &snapshot {
                if self.is_handled(*token) || !self.is_registered(*token) {
                    continue;
                }
                self.invoke(*token, callback, &payload);
            }

            let invoked = self
                .in_flight
                .borrow()
                .as_ref()
                .map(|in_flight| in_flight.handled.len())
                .unwrap_or_default();

            self.middleware.borrow_mut().after(&payload, invoked);
            invoked
        };

        self.swap_in_next_middleware();
        Ok(invoked)
    }

    /// Run the callbacks behind `tokens` for the current payload first
    ///
    /// Only valid from inside a dispatcher callback. Callbacks that already
    /// ran for this payload are skipped.
    pub fn wait_for(&self, tokens: &[DispatchToken]) -> Result<(), DispatchError> {
        let payload = self
            .in_flight
            .borrow()
            .as_ref()
            .map(|in_flight| in_flight.payload.clone())
            .ok_or(DispatchError::NotDispatching)?;

        for &token in tokens {
            if self.is_handled(token) {
                continue;
            }
            if self.is_pending(token) {
                tracing::warn!(%token, "Circular wait_for");
                return Err(DispatchError::CircularDependency(token));
            }

            let callback = self
                .callback(token)
                .ok_or(DispatchError::UnknownToken(token))?;
            self.invoke(token, &callback, &payload);
        }

        Ok(())
    }

    fn invoke(&self, token: DispatchToken, callback: &Callback<A>, payload: &A) {
        self.with_in_flight(|in_flight| {
            in_flight.pending.insert(token);
        });

        {
            let mut callback = callback.borrow_mut();
            (&mut *callback)(payload);
        }

        self.with_in_flight(|in_flight| {
            in_flight.handled.insert(token);
        });
    }

    /// Fails with `Reentrant` if `action` would be rejected right now
    pub(crate) fn check_not_dispatching(&self, action: &A) -> Result<(), DispatchError> {
        match self.in_flight_name() {
            Some(in_progress) => {
                let rejected = action.name();
                tracing::warn!(rejected, in_progress, "Rejected reentrant dispatch");
                Err(DispatchError::Reentrant {
                    rejected,
                    in_progress,
                })
            }
            None => Ok(()),
        }
    }

    fn swap_in_next_middleware(&self) {
        if let Some(middleware) = self.next_middleware.borrow_mut().take() {
            *self.middleware.borrow_mut() = middleware;
        }
    }

    fn callback(&self, token: DispatchToken) -> Option<Callback<A>> {
        self.callbacks
            .borrow()
            .iter()
            .find(|registration| registration.token == token)
            .map(|registration| registration.callback.clone())
    }

    fn in_flight_name(&self) -> Option<&'static str> {
        self.in_flight
            .borrow()
            .as_ref()
            .map(|in_flight| in_flight.payload.name())
    }

    fn is_pending(&self, token: DispatchToken) -> bool {
        self.in_flight
            .borrow()
            .as_ref()
            .is_some_and(|in_flight| in_flight.pending.contains(&token))
    }

    fn is_handled(&self, token: DispatchToken) -> bool {
        self.in_flight
            .borrow()
            .as_ref()
            .is_some_and(|in_flight| in_flight.handled.contains(&token))
    }

    fn with_in_flight(&self, f: impl FnOnce(&mut InFlight<A>)) {
        if let Some(in_flight) = self.in_flight.borrow_mut().as_mut() {
            f(in_flight);
        }
    }
}
