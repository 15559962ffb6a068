//! Views: render state pulled from stores and turn input into commands

use ratatui::{layout::Rect, Frame};

use crate::event::EventKind;

/// Where a view is in its lifetime
///
/// A view subscribes to its stores when it becomes `Mounted` and drops the
/// subscriptions when it goes back to `Unmounted`. Only mounted views hear
/// about store changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Unmounted,
    Mounted,
}

impl Lifecycle {
    pub fn is_mounted(self) -> bool {
        self == Lifecycle::Mounted
    }
}

/// A UI component
///
/// Views never mutate store state. They read stores when rendering and
/// answer input with commands of type `C`; the owner of the view maps
/// commands onto action creators.
///
/// # Example
///
/// ```ignore
/// use flux_dispatch::{Component, EventKind, Frame, Rect};
///
/// enum CounterCommand {
///     Increment,
/// }
///
/// struct Counter {
///     store: CounterStore,
/// }
///
/// impl Component<CounterCommand> for Counter {
///     type Props<'a> = bool;
///
///     fn handle_event(&mut self, event: &EventKind, _focused: Self::Props<'_>) -> impl IntoIterator<Item = CounterCommand> {
///         match event.key().map(|key| key.code) {
///             Some(KeyCode::Up) => Some(CounterCommand::Increment),
///             _ => None,
///         }
///     }
///
///     fn render(&mut self, frame: &mut Frame, area: Rect, _focused: Self::Props<'_>) {
///         let text = format!("Count: {}", self.store.count());
///         frame.render_widget(Paragraph::new(text), area);
///     }
/// }
/// ```
pub trait Component<C> {
    /// Extra data the parent passes in for one call
    type Props<'a>;

    /// Handle an event and return commands
    ///
    /// Returns any type implementing `IntoIterator<Item = C>`:
    /// - `None` - no commands (most common)
    /// - `Some(command)` - single command
    /// - `[a, b]` or `vec![...]` - several
    ///
    /// Default implementation returns nothing (render-only components).
    #[allow(unused_variables)]
    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = C> {
        None::<C>
    }

    /// Render the component to the frame
    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>);
}
