//! Action trait for typed dispatcher payloads

use std::fmt::Debug;

/// Marker trait for payloads that can be pushed through a [`Dispatcher`](crate::Dispatcher)
///
/// Actions describe an intent or an outcome. They should be:
/// - Clone: Actions may be logged, recorded, or replayed
/// - Debug: For debugging and logging
/// - Send + 'static: Result actions are produced on async tasks and
///   travel back to the dispatcher thread over a channel
///
/// Use `#[derive(Action)]` from `flux-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Category information generated by `#[action(infer_categories)]`
///
/// Categories group related actions (`ImagesLoad`, `ImagesDidLoad` both
/// belong to `"images"`). Uncategorized actions return `None`.
pub trait ActionCategory: Action {
    /// Enum of all categories for this action type
    type Category: Copy + Eq + Debug + 'static;

    /// Category name, if the action has one
    fn category(&self) -> Option<&'static str>;

    /// Category as an enum value
    fn category_enum(&self) -> Self::Category;
}

/// Short human-readable description of an action for logs
///
/// The default uses `Debug`, which can get noisy for actions that carry
/// large payloads. Override `summary` to keep log lines short.
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
