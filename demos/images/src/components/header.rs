use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{Component, ListCommand};

pub const APP_TITLE: &str = "MRW.lol";

/// Title line plus key hints
pub struct Header;

impl Header {
    pub const HEIGHT: u16 = 2;
}

impl Component<ListCommand> for Header {
    type Props<'a> = ();

    fn render(&mut self, frame: &mut Frame, area: Rect, _props: ()) {
        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

        let title = Line::from(Span::styled(
            APP_TITLE,
            Style::default().fg(Color::Magenta).bold(),
        ))
        .centered();
        frame.render_widget(Paragraph::new(title), chunks[0]);

        let hint = |k: &'static str, what: &'static str| {
            [
                Span::styled(k, Style::default().fg(Color::Cyan).bold()),
                Span::styled(what, Style::default().fg(Color::DarkGray)),
            ]
        };
        let hints = Line::from(
            [
                hint(" r", " reload  "),
                hint("j/k", " move  "),
                hint("q", " quit "),
            ]
            .concat(),
        )
        .centered();
        frame.render_widget(Paragraph::new(hints), chunks[1]);
    }
}
