//! Runtime pump for flux-dispatch apps.
//!
//! The dispatcher is synchronous and single-threaded; async work (network
//! fetches and the like) runs on tokio tasks. A [`Runtime`] owns the channel
//! those tasks report back on and feeds every result action into the
//! dispatcher on the owning thread, one at a time.

use std::cell::RefCell;
use std::future::Future;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::{DispatchError, Dispatcher};
use crate::event::{process_raw_event, spawn_event_poller, EventKind, RawEvent};
use crate::tasks::{TaskKey, TaskManager};
use crate::Action;

/// How often [`Runtime::settle`] re-checks for finished tasks.
const SETTLE_POLL: Duration = Duration::from_millis(10);

/// Configuration for the event poller.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    /// Timeout passed to each `crossterm::event::poll` call.
    pub poll_timeout: Duration,
    /// Sleep between poll cycles.
    pub loop_sleep: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(10),
            loop_sleep: Duration::from_millis(16),
        }
    }
}

/// What the event handler passed to [`Runtime::run`] wants next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventOutcome {
    /// Nothing visible changed.
    #[default]
    Ignored,
    /// Redraw on the next loop iteration.
    Render,
    /// Leave the loop.
    Quit,
}

impl From<bool> for EventOutcome {
    fn from(needs_render: bool) -> Self {
        if needs_render {
            Self::Render
        } else {
            Self::Ignored
        }
    }
}

/// Handle given to action creators
///
/// Cloning is cheap; every clone talks to the same dispatcher and task
/// manager.
pub struct ActionContext<A: Action> {
    dispatcher: Rc<Dispatcher<A>>,
    tasks: Rc<RefCell<TaskManager<A>>>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A: Action> Clone for ActionContext<A> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            tasks: self.tasks.clone(),
            action_tx: self.action_tx.clone(),
        }
    }
}

impl<A: Action> std::fmt::Debug for ActionContext<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl<A: Action> ActionContext<A> {
    /// Dispatch an action right now.
    pub fn dispatch(&self, action: A) -> Result<usize, DispatchError> {
        self.dispatcher.dispatch(action)
    }

    /// Queue an action for the runtime to dispatch later.
    ///
    /// Safe to call from inside a dispatcher callback.
    pub fn enqueue(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    /// Run `future` as a keyed task; its output is dispatched when it completes.
    pub fn spawn<F>(&self, key: impl Into<TaskKey>, future: F)
    where
        F: Future<Output = A> + Send + 'static,
    {
        self.tasks.borrow_mut().spawn(key, future);
    }

    /// Run `future` under a fresh key; never cancels other tasks.
    pub fn spawn_anonymous<F>(&self, prefix: &str, future: F) -> TaskKey
    where
        F: Future<Output = A> + Send + 'static,
    {
        self.tasks.borrow_mut().spawn_anonymous(prefix, future)
    }

    pub fn dispatcher(&self) -> &Rc<Dispatcher<A>> {
        &self.dispatcher
    }
}

/// Owns the dispatcher, the task manager and the result channel.
pub struct Runtime<A: Action> {
    dispatcher: Rc<Dispatcher<A>>,
    tasks: Rc<RefCell<TaskManager<A>>>,
    action_tx: mpsc::UnboundedSender<A>,
    action_rx: mpsc::UnboundedReceiver<A>,
    /// A queued action that was rejected and goes first next time
    held: Option<A>,
    poller_config: PollerConfig,
}

impl<A: Action> Default for Runtime<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> std::fmt::Debug for Runtime<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("dispatcher", &self.dispatcher)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl<A: Action> Runtime<A> {
    /// Create a runtime with a fresh dispatcher.
    pub fn new() -> Self {
        Self::with_dispatcher(Rc::new(Dispatcher::new()))
    }

    /// Create a runtime around an existing dispatcher.
    pub fn with_dispatcher(dispatcher: Rc<Dispatcher<A>>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            dispatcher,
            tasks: Rc::new(RefCell::new(TaskManager::new(action_tx.clone()))),
            action_tx,
            action_rx,
            held: None,
            poller_config: PollerConfig::default(),
        }
    }

    /// Configure event polling behavior.
    pub fn with_event_poller(mut self, config: PollerConfig) -> Self {
        self.poller_config = config;
        self
    }

    pub fn dispatcher(&self) -> &Rc<Dispatcher<A>> {
        &self.dispatcher
    }

    /// Handle for action creators.
    pub fn context(&self) -> ActionContext<A> {
        ActionContext {
            dispatcher: self.dispatcher.clone(),
            tasks: self.tasks.clone(),
            action_tx: self.action_tx.clone(),
        }
    }

    /// Send an action into the runtime queue.
    pub fn enqueue(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    /// Clone the action sender.
    pub fn action_tx(&self) -> mpsc::UnboundedSender<A> {
        self.action_tx.clone()
    }

    /// Whether every spawned task has finished.
    pub fn is_idle(&self) -> bool {
        self.tasks.borrow().is_idle()
    }

    /// Dispatch everything already queued, without waiting.
    ///
    /// Returns how many actions were dispatched. Stops at the first
    /// rejected dispatch; that action and the rest stay queued.
    pub fn dispatch_pending(&mut self) -> Result<usize, DispatchError> {
        let mut dispatched = 0;
        while let Some(action) = self.try_next() {
            if let Err(err) = self.dispatcher.check_not_dispatching(&action) {
                self.held = Some(action);
                return Err(err);
            }
            self.dispatcher.dispatch(action)?;
            dispatched += 1;
        }
        Ok(dispatched)
    }

    /// Wait for the next queued action and dispatch it.
    ///
    /// Returns `None` once the channel is closed, which cannot happen while
    /// the runtime is alive.
    pub async fn dispatch_next(&mut self) -> Option<Result<usize, DispatchError>> {
        let action = match self.held.take() {
            Some(action) => action,
            None => self.action_rx.recv().await?,
        };
        if let Err(err) = self.dispatcher.check_not_dispatching(&action) {
            self.held = Some(action);
            return Some(Err(err));
        }
        Some(self.dispatcher.dispatch(action))
    }

    /// Pump until no task is running and the queue is empty.
    ///
    /// Dispatch failures are logged and skipped.
    pub async fn settle(&mut self) {
        loop {
            self.drain_logged();

            if self.is_idle() {
                // A finished task has already sent its action
                if self.drain_logged() == 0 && self.is_idle() {
                    break;
                }
                continue;
            }

            if let Ok(Some(action)) =
                tokio::time::timeout(SETTLE_POLL, self.action_rx.recv()).await
            {
                self.dispatch_logged(action);
            }
        }
    }

    /// Run the event/action loop until the event handler asks to quit.
    ///
    /// `render` draws the whole frame. `on_event` handles a terminal event,
    /// typically by calling action creators. `take_dirty` is asked after
    /// every dispatch whether a view changed and needs a redraw.
    pub async fn run<B, FRender, FEvent, FDirty>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut render: FRender,
        mut on_event: FEvent,
        mut take_dirty: FDirty,
    ) -> io::Result<()>
    where
        B: Backend,
        FRender: FnMut(&mut Frame, Rect),
        FEvent: FnMut(&EventKind) -> EventOutcome,
        FDirty: FnMut() -> bool,
    {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<RawEvent>();
        let cancel_token = CancellationToken::new();
        let _handle = spawn_event_poller(
            event_tx,
            self.poller_config.poll_timeout,
            self.poller_config.loop_sleep,
            cancel_token.clone(),
        );

        let mut should_render = true;
        loop {
            if let Some(action) = self.held.take() {
                self.dispatch_logged(action);
            }
            should_render |= take_dirty();
            if should_render {
                terminal.draw(|frame| render(frame, frame.area()))?;
                should_render = false;
            }

            tokio::select! {
                Some(raw_event) = event_rx.recv() => {
                    let event = process_raw_event(raw_event);
                    match on_event(&event) {
                        EventOutcome::Quit => break,
                        EventOutcome::Render => should_render = true,
                        EventOutcome::Ignored => {}
                    }
                }

                Some(action) = self.action_rx.recv() => {
                    self.dispatch_logged(action);
                }

                else => {
                    break;
                }
            }
        }

        cancel_token.cancel();
        self.tasks.borrow_mut().cancel_all();
        Ok(())
    }

    fn try_next(&mut self) -> Option<A> {
        self.held.take().or_else(|| self.action_rx.try_recv().ok())
    }

    fn drain_logged(&mut self) -> usize {
        let mut drained = 0;
        while let Some(action) = self.try_next() {
            self.dispatch_logged(action);
            drained += 1;
        }
        drained
    }

    fn dispatch_logged(&self, action: A) {
        let name = action.name();
        if let Err(err) = self.dispatcher.dispatch(action) {
            tracing::warn!(action = %name, error = %err, "Queued action was not dispatched");
        }
    }
}
