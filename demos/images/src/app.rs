//! Top-level view: header, images list and the optional action log footer

use flux_dispatch::{DispatchError, EventKind, EventOutcome};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use crate::api::ImageSource;
use crate::components::{
    ActionLogBar, Component, Header, ImagesList, ImagesListProps, ListCommand,
};
use crate::context::AppContext;

pub struct App<S> {
    ctx: AppContext<S>,
    header: Header,
    list: ImagesList,
    log_bar: ActionLogBar,
    last_logged: Option<u64>,
}

impl<S: ImageSource> App<S> {
    pub fn new(ctx: AppContext<S>) -> Self {
        Self {
            ctx,
            header: Header,
            list: ImagesList::new(),
            log_bar: ActionLogBar,
            last_logged: None,
        }
    }

    /// Mount the images list, which starts the first load
    pub fn mount(&mut self) -> Result<(), DispatchError> {
        self.list.mount(&self.ctx)
    }

    pub fn unmount(&mut self) {
        self.list.unmount();
    }

    pub fn context(&self) -> &AppContext<S> {
        &self.ctx
    }

    pub fn list(&self) -> &ImagesList {
        &self.list
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let log_height = if self.ctx.action_log.is_some() {
            ActionLogBar::HEIGHT
        } else {
            0
        };
        let chunks = Layout::vertical([
            Constraint::Length(Header::HEIGHT),
            Constraint::Min(3),
            Constraint::Length(log_height),
        ])
        .split(area);

        self.header.render(frame, chunks[0], ());
        self.list
            .render(frame, chunks[1], ImagesListProps { is_focused: true });

        if let Some(log) = &self.ctx.action_log {
            self.log_bar.render(frame, chunks[2], &*log.borrow());
        }
    }

    pub fn handle_event(&mut self, event: &EventKind) -> EventOutcome {
        if let EventKind::Resize(..) = event {
            return EventOutcome::Render;
        }

        let commands: Vec<ListCommand> = self
            .list
            .handle_event(event, ImagesListProps { is_focused: true })
            .into_iter()
            .collect();

        let mut outcome = EventOutcome::Ignored;
        for command in commands {
            match command {
                ListCommand::Quit => return EventOutcome::Quit,
                ListCommand::Reload => {
                    if let Err(e) = self.ctx.actions.load_images() {
                        tracing::warn!(error = %e, "Reload was not started");
                    }
                }
                ListCommand::SelectNext => {
                    self.list.select_next();
                    outcome = EventOutcome::Render;
                }
                ListCommand::SelectPrev => {
                    self.list.select_prev();
                    outcome = EventOutcome::Render;
                }
            }
        }
        outcome
    }

    /// Whether anything on screen changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        let list = self.list.take_dirty();

        let newest = self.ctx.action_log.as_ref().and_then(|log| {
            log.borrow().recent(1).next().map(|entry| entry.sequence)
        });
        let log = newest != self.last_logged;
        self.last_logged = newest;

        list || log
    }
}
