//! Footer status bar widget
//!
//! Displays the API base, last full refresh, last action and key help.

use chrono::Utc;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::DashboardApp;
use crate::tui::theme::THEME;

/// Render the footer status bar
pub fn render_footer(f: &mut Frame, area: Rect, app: &DashboardApp) {
    let refreshed = match app.snapshot.last_full_refresh() {
        Some(at) => format!("{}s ago", (Utc::now() - at).num_seconds().max(0)),
        None => "never".to_string(),
    };

    let mut spans = vec![
        Span::raw("  API: "),
        Span::styled(app.base_url.clone(), THEME.highlight_style()),
        Span::raw("  Refreshed: "),
        Span::styled(refreshed, THEME.highlight_style()),
        Span::styled(
            format!(" (every {}s)", app.poll_interval.as_secs()),
            THEME.inactive_style(),
        ),
    ];

    if let Some(outcome) = app.dialog.outcome() {
        spans.push(Span::raw("  Last action: "));
        spans.push(Span::styled(
            outcome.detail.clone(),
            THEME.outcome_style(outcome.status),
        ));
    }

    spans.push(Span::styled(
        "  [q]uit [r]efresh [K]ill [Tab] card [v] raw [?] help",
        THEME.inactive_style(),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
