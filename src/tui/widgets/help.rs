//! Help overlay

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::kill_dialog::centered_rect;
use crate::tui::theme::THEME;

const KEYS: &[(&str, &str)] = &[
    ("q", "quit"),
    ("r", "refresh all sources now"),
    ("K", "kill switch (confirmation required)"),
    ("L", "same, offered when a lock is recommended"),
    ("y / Enter", "confirm"),
    ("n / Esc", "cancel (disabled while sending)"),
    ("Tab", "select next card"),
    ("v", "toggle raw JSON on selected card"),
    ("?", "toggle this help"),
];

pub fn render_help(f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = KEYS
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:<12}"), THEME.highlight_style()),
                Span::styled(*what, THEME.text_style()),
            ])
        })
        .collect();

    let popup = centered_rect(50, 50, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Keys ")
                .title_style(THEME.title_style())
                .border_style(THEME.border_style()),
        ),
        popup,
    );
}
