use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use flux_dispatch::ActionLog;

use super::{Component, ListCommand};

/// Footer listing the most recent dispatched actions, newest first
pub struct ActionLogBar;

impl ActionLogBar {
    pub const ROWS: u16 = 3;
    pub const HEIGHT: u16 = Self::ROWS + 1;
}

impl Component<ListCommand> for ActionLogBar {
    type Props<'a> = &'a ActionLog;

    fn render(&mut self, frame: &mut Frame, area: Rect, log: &ActionLog) {
        let lines: Vec<Line> = log
            .recent(Self::ROWS as usize)
            .map(|entry| {
                let callbacks = entry
                    .callbacks
                    .map(|n| format!(" -> {n}"))
                    .unwrap_or_default();
                Line::from(vec![
                    Span::styled(
                        format!("#{:<4}", entry.sequence),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(entry.summary.clone()),
                    Span::styled(callbacks, Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();

        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" actions ");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
