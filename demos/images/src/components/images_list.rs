//! The list of uploaded images
//!
//! On mount the view takes a snapshot of the store, subscribes to it and
//! asks for a fresh load. Every change notification replaces the snapshot
//! and marks the view dirty so the render loop redraws it. Unmounting (or
//! dropping the view) ends the subscription.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::KeyCode;
use flux_dispatch::{DispatchError, EventKind, Lifecycle, Subscription};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::Component;
use crate::api::ImageSource;
use crate::context::AppContext;
use crate::image::Image;

pub const EMPTY_PLACEHOLDER: &str = "List of Images will appear here...";

/// What the user asked the list for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCommand {
    Reload,
    SelectNext,
    SelectPrev,
    Quit,
}

pub struct ImagesListProps {
    pub is_focused: bool,
}

/// State shared with the store listener
struct Snapshot {
    images: Rc<[Image]>,
    dirty: bool,
    refreshes: usize,
}

impl Snapshot {
    fn replace(&mut self, images: Rc<[Image]>) {
        self.images = images;
        self.dirty = true;
    }
}

pub struct ImagesList {
    lifecycle: Lifecycle,
    snapshot: Rc<RefCell<Snapshot>>,
    subscription: Option<Subscription>,
    list_state: ListState,
}

impl Default for ImagesList {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagesList {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Unmounted,
            snapshot: Rc::new(RefCell::new(Snapshot {
                images: Rc::from(Vec::new()),
                dirty: false,
                refreshes: 0,
            })),
            subscription: None,
            list_state: ListState::default(),
        }
    }

    /// Read the store, subscribe to it, then trigger a load
    ///
    /// Mounting a mounted view does nothing. If the load cannot be
    /// dispatched the view stays mounted and the error is returned.
    pub fn mount<S: ImageSource>(&mut self, ctx: &AppContext<S>) -> Result<(), DispatchError> {
        if self.lifecycle.is_mounted() {
            return Ok(());
        }

        self.snapshot.borrow_mut().replace(ctx.images.get_images());

        let view = Rc::downgrade(&self.snapshot);
        let store = ctx.images.downgrade();
        self.subscription = Some(ctx.images.subscribe(move || {
            let (Some(view), Some(store)) = (view.upgrade(), store.upgrade()) else {
                return;
            };
            let mut view = view.borrow_mut();
            view.replace(store.get_images());
            view.refreshes += 1;
        }));
        self.lifecycle = Lifecycle::Mounted;
        tracing::debug!("Images list mounted");

        ctx.actions.load_images().map(|_| ())
    }

    /// Stop listening to the store
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            tracing::debug!("Images list unmounted");
        }
        self.lifecycle = Lifecycle::Unmounted;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    /// The images as of the last notification
    pub fn images(&self) -> Rc<[Image]> {
        self.snapshot.borrow().images.clone()
    }

    /// Whether the view changed since the last call
    pub fn take_dirty(&self) -> bool {
        std::mem::take(&mut self.snapshot.borrow_mut().dirty)
    }

    /// How many change notifications the view has handled
    pub fn refresh_count(&self) -> usize {
        self.snapshot.borrow().refreshes
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn selected_image(&self) -> Option<Image> {
        let index = self.list_state.selected()?;
        self.snapshot.borrow().images.get(index).cloned()
    }

    pub fn select_next(&mut self) {
        let len = self.snapshot.borrow().images.len();
        let next = match self.list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some((i + 1).min(len - 1)),
            None => Some(0),
        };
        self.list_state.select(next);
    }

    pub fn select_prev(&mut self) {
        let len = self.snapshot.borrow().images.len();
        let prev = match self.list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.saturating_sub(1).min(len - 1)),
            None => Some(0),
        };
        self.list_state.select(prev);
    }
}

impl Component<ListCommand> for ImagesList {
    type Props<'a> = ImagesListProps;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = ListCommand> {
        if !props.is_focused {
            return None;
        }
        if event.is_interrupt() {
            return Some(ListCommand::Quit);
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Char('r') | KeyCode::F(5) => Some(ListCommand::Reload),
                KeyCode::Char('j') | KeyCode::Down => Some(ListCommand::SelectNext),
                KeyCode::Char('k') | KeyCode::Up => Some(ListCommand::SelectPrev),
                KeyCode::Char('q') | KeyCode::Esc => Some(ListCommand::Quit),
                _ => None,
            },
            EventKind::Scroll { delta, .. } if *delta > 0 => Some(ListCommand::SelectNext),
            EventKind::Scroll { .. } => Some(ListCommand::SelectPrev),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let images = self.images();

        let border = if props.is_focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" Images ({}) ", images.len()));

        if images.is_empty() {
            let placeholder = Paragraph::new(EMPTY_PLACEHOLDER)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        // A reload can shrink the list under the selection
        if let Some(i) = self.list_state.selected() {
            if i >= images.len() {
                self.list_state.select(Some(images.len() - 1));
            }
        }

        let items: Vec<ListItem> = images
            .iter()
            .map(|image| {
                let mut spans = vec![
                    Span::styled(format!("{:<26}", image.id), Style::default().fg(Color::Yellow)),
                    Span::raw(image.label().to_string()),
                ];
                if let Some(timestamp) = image.timestamp {
                    spans.push(Span::styled(
                        format!("  {}", timestamp.format("%Y-%m-%d")),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray).bold())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}
