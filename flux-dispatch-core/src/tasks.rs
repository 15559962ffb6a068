//! Task manager for the async half of action creators
//!
//! Action creators dispatch their "started" action synchronously and then
//! hand the slow part (network, disk) to the task manager. Each task is a
//! future that resolves to a result action; the action is sent back over
//! the runtime's channel and dispatched on the dispatcher's thread.
//!
//! Provides:
//! - Keyed tasks: spawning with a key that is running cancels the old task
//! - Anonymous tasks: every call gets its own key, nothing is replaced
//! - Manual cancellation
//!
//! # Example
//!
//! ```ignore
//! use flux_dispatch::tasks::{TaskManager, TaskKey};
//!
//! let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut tasks = TaskManager::new(action_tx);
//!
//! // Replaces any running "search" task
//! tasks.spawn("search", async {
//!     let results = search(query).await;
//!     Action::SearchDidLoad(results)
//! });
//!
//! // Runs alongside earlier loads
//! let key = tasks.spawn_anonymous("load_images", async {
//!     match fetch_images().await {
//!         Ok(images) => Action::ImagesDidLoad(images),
//!         Err(e) => Action::ImagesDidFail(e),
//!     }
//! });
//!
//! // Cancel all tasks (e.g., on shutdown)
//! tasks.cancel_all();
//! ```

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};

use crate::Action;

/// Identifies a task for cancellation and replacement.
///
/// Tasks with the same key are mutually exclusive - spawning a new task
/// with a key that's already running will cancel the existing task.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    /// Create a new task key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the key name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Manages async task lifecycle with automatic cancellation.
///
/// The task manager maintains a registry of running tasks by key.
/// When a new task is spawned with a key that already exists,
/// the existing task is automatically cancelled before the new one starts.
/// Finished tasks are pruned lazily.
///
/// # Type Parameters
///
/// - `A`: The action type that tasks produce
pub struct TaskManager<A> {
    tasks: HashMap<TaskKey, AbortHandle>,
    action_tx: mpsc::UnboundedSender<A>,
    next_anonymous: u64,
}

impl<A> std::fmt::Debug for TaskManager<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl<A> TaskManager<A>
where
    A: Action,
{
    /// Create a new task manager.
    ///
    /// The `action_tx` channel is used to send actions back to the
    /// dispatcher thread when tasks complete.
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            tasks: HashMap::new(),
            action_tx,
            next_anonymous: 0,
        }
    }

    /// Spawn a task, cancelling any existing task with the same key.
    ///
    /// The future should return an action that will be sent to the action channel
    /// when the task completes. If the task is cancelled before completion,
    /// no action is sent.
    ///
    /// # Example
    ///
    /// ```ignore
    /// tasks.spawn("images", async move {
    ///     match source.fetch_images().await {
    ///         Ok(images) => Action::ImagesDidLoad(images),
    ///         Err(e) => Action::ImagesDidFail(e),
    ///     }
    /// });
    /// ```
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let key = key.into();

        // Cancel existing task with this key
        self.cancel(&key);
        self.prune();

        let tx = self.action_tx.clone();
        let handle: JoinHandle<()> = tokio::spawn(async move {
            let action = future.await;
            let _ = tx.send(action);
        });

        tracing::trace!(task = %key, "Spawned task");
        self.tasks.insert(key, handle.abort_handle());
        self
    }

    /// Spawn a task under a fresh key derived from `prefix`.
    ///
    /// Unlike [`spawn`](Self::spawn), this never cancels anything: two calls
    /// with the same prefix run side by side. Returns the generated key.
    pub fn spawn_anonymous<F>(&mut self, prefix: &str, future: F) -> TaskKey
    where
        F: Future<Output = A> + Send + 'static,
    {
        self.next_anonymous += 1;
        let key = TaskKey::new(format!("{}#{}", prefix, self.next_anonymous));
        self.spawn(key.clone(), future);
        key
    }

    /// Cancel a task by key.
    ///
    /// If no task exists with the given key, this is a no-op.
    pub fn cancel(&mut self, key: &TaskKey) {
        if let Some(handle) = self.tasks.remove(key) {
            tracing::trace!(task = %key, "Cancelled task");
            handle.abort();
        }
    }

    /// Cancel all running tasks.
    ///
    /// Useful for cleanup on shutdown.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Check if a task with the given key is currently running.
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Whether every spawned task has finished (or none were spawned).
    pub fn is_idle(&self) -> bool {
        self.tasks.values().all(AbortHandle::is_finished)
    }

    /// Get the number of running tasks.
    pub fn len(&self) -> usize {
        self.tasks
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Check if there are no running tasks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the keys of all running tasks.
    pub fn running_keys(&self) -> impl Iterator<Item = &TaskKey> {
        self.tasks
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(key, _)| key)
    }

    fn prune(&mut self) {
        self.tasks.retain(|_, handle| !handle.is_finished());
    }
}

impl<A> Drop for TaskManager<A> {
    fn drop(&mut self) {
        // Abort all running tasks on drop
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
