//! Change notification for stores
//!
//! Stores announce "my state changed" through a [`ChangeEmitter`]. Views
//! subscribe and re-read the store when notified. Subscribing returns a
//! [`Subscription`] that removes the listener when dropped, so a torn-down
//! view cannot be left registered by accident.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifies a listener registered on a [`ChangeEmitter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn id(self) -> u64 {
        self.0
    }
}

type Listener = Rc<RefCell<dyn FnMut()>>;

struct Listeners {
    entries: RefCell<Vec<(ListenerId, Listener)>>,
    next_id: Cell<u64>,
}

impl Listeners {
    fn contains(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }
}

/// Ordered set of change listeners
///
/// Listeners run synchronously, in subscription order. A listener removed by
/// an earlier listener during the same [`emit`](ChangeEmitter::emit) is
/// skipped.
pub struct ChangeEmitter {
    listeners: Rc<Listeners>,
}

impl Default for ChangeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChangeEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeEmitter")
            .field("listeners", &self.len())
            .finish()
    }
}

impl ChangeEmitter {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(Listeners {
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Add a listener and get back a handle that removes it on drop
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut() + 'static,
    {
        let id = self.add_listener(listener);
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Add a listener that stays registered until [`remove_listener`](Self::remove_listener)
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut() + 'static,
    {
        let id = ListenerId(self.listeners.next_id.get());
        self.listeners.next_id.set(id.0 + 1);

        let listener: Listener = Rc::new(RefCell::new(listener));
        self.listeners.entries.borrow_mut().push((id, listener));
        id
    }

    /// Remove a listener. Unknown ids are ignored and return `false`.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Whether `id` is still registered
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.entries.borrow().is_empty()
    }

    /// Notify every listener. Returns how many were called.
    pub fn emit(&self) -> usize {
        let snapshot: Vec<(ListenerId, Listener)> = self
            .listeners
            .entries
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, listener.clone()))
            .collect();

        let mut notified = 0;
        for (id, listener) in snapshot {
            if !self.listeners.contains(id) {
                continue;
            }
            match listener.try_borrow_mut() {
                Ok(mut listener) => {
                    (&mut *listener)();
                    notified += 1;
                }
                Err(_) => {
                    tracing::warn!(listener = id.0, "Listener re-entered its own change emission");
                }
            }
        }
        notified
    }
}

/// RAII handle for a change listener
///
/// Dropping the subscription (or calling [`unsubscribe`](Subscription::unsubscribe))
/// removes the listener. Outliving the emitter is fine.
#[must_use = "dropping a Subscription removes the listener immediately"]
pub struct Subscription {
    id: ListenerId,
    listeners: Weak<Listeners>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        self.listeners
            .upgrade()
            .is_some_and(|listeners| listeners.contains(self.id))
    }

    /// Remove the listener now
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.id);
        }
    }
}
