//! Stores: state slices updated by a reducer registered with the dispatcher

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dispatcher::{DispatchToken, Dispatcher};
use crate::emitter::{ChangeEmitter, ListenerId, Subscription};
use crate::Action;

/// A reducer function that handles actions and mutates state
///
/// Receives the payload by reference: every store registered with the
/// dispatcher sees the same, unmodified action.
/// Returns `true` if the state changed and listeners should be notified.
pub type Reducer<S, A> = fn(&mut S, &A) -> bool;

/// A store that owns one slice of state
///
/// On construction the store registers exactly one callback with the
/// dispatcher. The callback runs the reducer; if the reducer reports a
/// change, every change listener is notified synchronously, after the
/// state borrow has been released so listeners can read the store.
///
/// # Example
/// ```ignore
/// #[derive(Default)]
/// struct CounterState {
///     count: i32,
/// }
///
/// fn reducer(state: &mut CounterState, action: &CounterAction) -> bool {
///     match action {
///         CounterAction::Increment => {
///             state.count += 1;
///             true
///         }
///         CounterAction::Noop => false,
///     }
/// }
///
/// let dispatcher = Rc::new(Dispatcher::new());
/// let store = ReduceStore::register(&dispatcher, CounterState::default(), reducer);
/// let _sub = store.subscribe(|| println!("changed"));
///
/// dispatcher.dispatch(CounterAction::Increment)?;
/// assert_eq!(store.state().count, 1);
/// ```
pub struct ReduceStore<S, A: Action> {
    state: RefCell<S>,
    reducer: Reducer<S, A>,
    emitter: ChangeEmitter,
    dispatcher: Weak<Dispatcher<A>>,
    token: DispatchToken,
}

impl<S, A: Action> fmt::Debug for ReduceStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReduceStore")
            .field("token", &self.token)
            .field("listeners", &self.emitter.len())
            .finish()
    }
}

impl<S: 'static, A: Action> ReduceStore<S, A> {
    /// Create the store and register its callback with `dispatcher`
    pub fn register(dispatcher: &Rc<Dispatcher<A>>, state: S, reducer: Reducer<S, A>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let store = weak.clone();
            let token = dispatcher.register(move |action: &A| {
                if let Some(store) = store.upgrade() {
                    store.reduce(action);
                }
            });

            Self {
                state: RefCell::new(state),
                reducer,
                emitter: ChangeEmitter::new(),
                dispatcher: Rc::downgrade(dispatcher),
                token,
            }
        })
    }
}

impl<S, A: Action> ReduceStore<S, A> {
    /// Token of this store's dispatcher callback, for `wait_for`
    pub fn dispatch_token(&self) -> DispatchToken {
        self.token
    }

    /// Borrow the current state
    ///
    /// Don't hold the borrow across a dispatch.
    pub fn state(&self) -> Ref<'_, S> {
        self.state.borrow()
    }

    /// Read a value out of the current state
    pub fn select<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.state.borrow())
    }

    /// Subscribe to change notifications
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut() + 'static,
    {
        self.emitter.subscribe(listener)
    }

    /// Register a change listener that stays until removed
    pub fn add_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut() + 'static,
    {
        self.emitter.add_listener(listener)
    }

    /// Remove a change listener. Unknown ids are a no-op.
    pub fn remove_change_listener(&self, id: ListenerId) -> bool {
        self.emitter.remove_listener(id)
    }

    /// Number of change listeners
    pub fn listener_count(&self) -> usize {
        self.emitter.len()
    }

    fn reduce(&self, action: &A) {
        let changed = {
            let mut state = self.state.borrow_mut();
            (self.reducer)(&mut state, action)
        };

        if changed {
            let notified = self.emitter.emit();
            tracing::debug!(action = %action.name(), listeners = notified, "Store changed");
        }
    }
}

impl<S, A: Action> Drop for ReduceStore<S, A> {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.upgrade() {
            dispatcher.unregister(self.token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct TestState {
        counter: i32,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        Decrement,
        NoOp,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Increment => "Increment",
                TestAction::Decrement => "Decrement",
                TestAction::NoOp => "NoOp",
            }
        }
    }

    fn test_reducer(state: &mut TestState, action: &TestAction) -> bool {
        match action {
            TestAction::Increment => {
                state.counter += 1;
                true
            }
            TestAction::Decrement => {
                state.counter -= 1;
                true
            }
            TestAction::NoOp => false,
        }
    }

    fn setup() -> (
        Rc<Dispatcher<TestAction>>,
        Rc<ReduceStore<TestState, TestAction>>,
    ) {
        let dispatcher = Rc::new(Dispatcher::new());
        let store = ReduceStore::register(&dispatcher, TestState::default(), test_reducer);
        (dispatcher, store)
    }

    #[test]
    fn test_store_dispatch() {
        let (dispatcher, store) = setup();

        dispatcher.dispatch(TestAction::Increment).unwrap();
        assert_eq!(store.state().counter, 1);

        dispatcher.dispatch(TestAction::Increment).unwrap();
        assert_eq!(store.state().counter, 2);

        dispatcher.dispatch(TestAction::Decrement).unwrap();
        assert_eq!(store.select(|s| s.counter), 1);
    }

    #[test]
    fn test_registers_exactly_one_callback() {
        let (dispatcher, store) = setup();
        assert_eq!(dispatcher.len(), 1);
        assert!(dispatcher.is_registered(store.dispatch_token()));
    }

    #[test]
    fn test_listeners_notified_on_change_only() {
        let (dispatcher, store) = setup();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let _sub = store.subscribe(move || seen.set(seen.get() + 1));

        dispatcher.dispatch(TestAction::NoOp).unwrap();
        assert_eq!(count.get(), 0);

        dispatcher.dispatch(TestAction::Increment).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_listener_can_read_store() {
        let (dispatcher, store) = setup();
        let seen = Rc::new(Cell::new(0));

        let reader = Rc::downgrade(&store);
        let seen_value = seen.clone();
        let _sub = store.subscribe(move || {
            if let Some(store) = reader.upgrade() {
                seen_value.set(store.state().counter);
            }
        });

        dispatcher.dispatch(TestAction::Increment).unwrap();
        dispatcher.dispatch(TestAction::Increment).unwrap();
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_manual_listener_removal() {
        let (dispatcher, store) = setup();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let id = store.add_change_listener(move || seen.set(seen.get() + 1));

        dispatcher.dispatch(TestAction::Increment).unwrap();
        assert!(store.remove_change_listener(id));
        assert!(!store.remove_change_listener(id));
        dispatcher.dispatch(TestAction::Increment).unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_drop_unregisters_callback() {
        let (dispatcher, store) = setup();
        drop(store);
        assert!(dispatcher.is_empty());
        assert_eq!(dispatcher.dispatch(TestAction::Increment), Ok(0));
    }

    #[test]
    fn test_wait_for_between_stores() {
        fn doubled(state: &mut TestState, action: &TestAction) -> bool {
            match action {
                TestAction::Increment => {
                    state.counter += 2;
                    true
                }
                _ => false,
            }
        }

        let dispatcher = Rc::new(Dispatcher::new());
        let observed = Rc::new(Cell::new(-1));

        // Registered before the counter store, but waits for it
        let counter_token = Rc::new(Cell::new(None));
        let counter_store: Rc<RefCell<Option<Rc<ReduceStore<TestState, TestAction>>>>> =
            Rc::default();
        {
            let weak = Rc::downgrade(&dispatcher);
            let token = counter_token.clone();
            let store = counter_store.clone();
            let observed = observed.clone();
            dispatcher.register(move |_: &TestAction| {
                let dispatcher = weak.upgrade().unwrap();
                dispatcher.wait_for(&[token.get().unwrap()]).unwrap();
                let value = store.borrow().as_ref().unwrap().state().counter;
                observed.set(value);
            });
        }

        let store = ReduceStore::register(&dispatcher, TestState::default(), doubled);
        counter_token.set(Some(store.dispatch_token()));
        *counter_store.borrow_mut() = Some(store);

        dispatcher.dispatch(TestAction::Increment).unwrap();
        assert_eq!(observed.get(), 2);
    }
}
