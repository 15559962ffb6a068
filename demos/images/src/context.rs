//! Per-run wiring of dispatcher, stores and action creators

use std::rc::Rc;

use flux_dispatch::{Dispatcher, Runtime, SharedActionLog};

use crate::action::ImageAction;
use crate::actions::ImageActions;
use crate::api::ImageSource;
use crate::store::ImagesListStore;

/// Everything a view needs, built once per app run (or per test)
pub struct AppContext<S> {
    pub dispatcher: Rc<Dispatcher<ImageAction>>,
    pub images: ImagesListStore,
    pub actions: ImageActions<S>,
    /// Recent actions, when the action log is enabled
    pub action_log: Option<SharedActionLog>,
}

impl<S: ImageSource> AppContext<S> {
    pub fn new(runtime: &Runtime<ImageAction>, source: S) -> Self {
        let dispatcher = runtime.dispatcher().clone();
        Self {
            images: ImagesListStore::new(&dispatcher),
            actions: ImageActions::new(runtime.context(), source),
            dispatcher,
            action_log: None,
        }
    }

    pub fn with_action_log(mut self, log: SharedActionLog) -> Self {
        self.action_log = Some(log);
        self
    }
}
