//! Test utilities for flux-dispatch applications
//!
//! - [`key`] / [`char_key`]: build `KeyEvent`s (`key("ctrl+c")`, `key("down")`)
//! - [`ActionRecorder`]: a dispatcher callback that remembers every payload
//! - [`TestHarness`]: a [`Runtime`] plus a recorder, for driving action
//!   creators end to end
//! - [`RenderHarness`]: render into ratatui's `TestBackend` and read the
//!   screen back as text
//! - Assertion macros for verifying dispatched actions
//!
//! # Example
//!
//! ```ignore
//! use flux_dispatch::testing::TestHarness;
//! use flux_dispatch::assert_dispatched;
//!
//! let mut harness = TestHarness::<ImageAction>::new();
//! let actions = ImageActions::new(harness.context(), source);
//! actions.load_images()?;
//! harness.settle().await;
//!
//! let dispatched = harness.dispatched();
//! assert_dispatched!(dispatched, ImageAction::ImagesDidLoad(_));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::{Frame, Terminal};

use crate::dispatcher::{DispatchToken, Dispatcher};
use crate::event::EventKind;
use crate::runtime::{ActionContext, Runtime};
use crate::{Action, ActionCategory};

/// Create a `KeyEvent` from a key string like `"q"`, `"ctrl+c"` or `"down"`.
///
/// # Examples
///
/// ```
/// use flux_dispatch_core::testing::key;
/// use crossterm::event::{KeyCode, KeyModifiers};
///
/// let k = key("ctrl+c");
/// assert_eq!(k.code, KeyCode::Char('c'));
/// assert!(k.modifiers.contains(KeyModifiers::CONTROL));
/// ```
///
/// # Panics
///
/// Panics if the key string cannot be parsed.
pub fn key(s: &str) -> KeyEvent {
    parse_key(s).unwrap_or_else(|| panic!("Invalid key string: {:?}", s))
}

fn parse_key(s: &str) -> Option<KeyEvent> {
    let s = s.trim().to_lowercase();
    let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
    let key_part = parts.pop().filter(|k| !k.is_empty())?;

    let mut modifiers = KeyModifiers::empty();
    for part in parts {
        match part {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            _ => return None,
        }
    }

    let code = match key_part {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        single => {
            let mut chars = single.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(c)
        }
    };

    Some(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    })
}

/// Create a `KeyEvent` for a character with no modifiers.
pub fn char_key(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::empty(),
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// Wrap [`key`] in an [`EventKind`] for `Component::handle_event`.
pub fn key_event(s: &str) -> EventKind {
    EventKind::Key(key(s))
}

/// Records every action delivered by a dispatcher, in order.
///
/// The recorder registers one callback; dropping it unregisters.
pub struct ActionRecorder<A: Action> {
    seen: Rc<RefCell<Vec<A>>>,
    dispatcher: Rc<Dispatcher<A>>,
    token: DispatchToken,
}

impl<A: Action> ActionRecorder<A> {
    pub fn attach(dispatcher: &Rc<Dispatcher<A>>) -> Self {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let token = dispatcher.register(move |action: &A| sink.borrow_mut().push(action.clone()));
        Self {
            seen,
            dispatcher: dispatcher.clone(),
            token,
        }
    }

    /// Everything recorded so far
    pub fn actions(&self) -> Vec<A> {
        self.seen.borrow().clone()
    }

    /// Take everything recorded so far
    pub fn drain(&self) -> Vec<A> {
        std::mem::take(&mut *self.seen.borrow_mut())
    }

    /// Action names recorded so far
    pub fn names(&self) -> Vec<&'static str> {
        self.seen.borrow().iter().map(Action::name).collect()
    }

    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }
}

impl<A: ActionCategory> ActionRecorder<A> {
    /// Recorded actions that belong to `category`
    pub fn in_category(&self, category: &str) -> Vec<A> {
        self.seen
            .borrow()
            .iter()
            .filter(|action| action.category() == Some(category))
            .cloned()
            .collect()
    }
}

impl<A: Action> Drop for ActionRecorder<A> {
    fn drop(&mut self) {
        self.dispatcher.unregister(self.token);
    }
}

/// Runtime plus recorder, for testing action creators and stores together.
///
/// The recorder is registered first, so it sees each payload before any
/// store created afterwards.
///
/// # Example
///
/// ```ignore
/// let mut harness = TestHarness::<ImageAction>::new();
/// let store = ImagesListStore::new(harness.dispatcher());
///
/// harness.context().dispatch(ImageAction::ImagesLoad)?;
/// harness.settle().await;
/// assert_eq!(harness.dispatched(), vec![ImageAction::ImagesLoad]);
/// ```
pub struct TestHarness<A: Action> {
    runtime: Runtime<A>,
    recorder: ActionRecorder<A>,
}

impl<A: Action> Default for TestHarness<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> TestHarness<A> {
    pub fn new() -> Self {
        let runtime = Runtime::new();
        let recorder = ActionRecorder::attach(runtime.dispatcher());
        Self { runtime, recorder }
    }

    pub fn dispatcher(&self) -> &Rc<Dispatcher<A>> {
        self.runtime.dispatcher()
    }

    pub fn context(&self) -> ActionContext<A> {
        self.runtime.context()
    }

    pub fn runtime(&mut self) -> &mut Runtime<A> {
        &mut self.runtime
    }

    /// Pump the runtime until every task has finished.
    pub async fn settle(&mut self) {
        self.runtime.settle().await;
    }

    /// Everything dispatched so far
    pub fn dispatched(&self) -> Vec<A> {
        self.recorder.actions()
    }

    /// Take everything dispatched so far
    pub fn drain_dispatched(&self) -> Vec<A> {
        self.recorder.drain()
    }

    pub fn dispatched_names(&self) -> Vec<&'static str> {
        self.recorder.names()
    }

    pub fn recorder(&self) -> &ActionRecorder<A> {
        &self.recorder
    }
}

/// Renders into a ratatui [`TestBackend`] for snapshot-style assertions.
///
/// # Example
///
/// ```ignore
/// let mut render = RenderHarness::new(40, 10);
/// let output = render.render_to_string_plain(|frame| {
///     view.render(frame, frame.area(), ());
/// });
/// assert!(output.contains("List of Images"));
/// ```
pub struct RenderHarness {
    terminal: Terminal<TestBackend>,
}

impl RenderHarness {
    /// # Panics
    ///
    /// Panics if the test terminal cannot be created.
    pub fn new(width: u16, height: u16) -> Self {
        let terminal = Terminal::new(TestBackend::new(width, height))
            .unwrap_or_else(|err| panic!("failed to create test terminal: {err}"));
        Self { terminal }
    }

    /// Draw one frame and return the resulting buffer.
    pub fn render<F>(&mut self, render: F) -> &Buffer
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal
            .draw(render)
            .unwrap_or_else(|err| panic!("failed to draw test frame: {err}"));
        self.terminal.backend().buffer()
    }

    /// Draw one frame and return its text, one line per row, styles dropped.
    pub fn render_to_string_plain<F>(&mut self, render: F) -> String
    where
        F: FnOnce(&mut Frame),
    {
        buffer_to_string_plain(self.render(render))
    }
}

/// Text content of `buffer`, rows joined by newlines, trailing spaces trimmed.
pub fn buffer_to_string_plain(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            line.push_str(buffer[(x, y)].symbol());
        }
        out.push_str(line.trim_end());
        if y + 1 < area.bottom() {
            out.push('\n');
        }
    }
    out
}

/// Assert that an action matching a pattern was dispatched.
///
/// # Example
///
/// ```ignore
/// let dispatched = harness.dispatched();
/// assert_dispatched!(dispatched, ImageAction::ImagesLoad);
/// assert_dispatched!(dispatched, ImageAction::ImagesDidLoad(images) if images.len() == 2);
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be dispatched, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that no action matching a pattern was dispatched.
#[macro_export]
macro_rules! assert_not_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be dispatched, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find the first dispatched action matching a pattern.
#[macro_export]
macro_rules! find_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count dispatched actions matching a pattern.
#[macro_export]
macro_rules! count_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}
