//! Main UI rendering logic
//!
//! Orchestrates the layout and renders all widgets.

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::tui::app::DashboardApp;
use crate::tui::widgets;

/// Render the entire UI
pub fn render(f: &mut Frame, app: &DashboardApp) {
    // Main vertical layout
    let chunks = Layout::vertical([
        Constraint::Length(2), // Safety banner
        Constraint::Min(12),   // Source cards (fills remaining)
        Constraint::Length(1), // Footer status bar
    ])
    .split(f.area());

    widgets::render_banner(f, chunks[0], app);
    widgets::render_cards(f, chunks[1], app);
    widgets::render_footer(f, chunks[2], app);

    // Overlays
    if app.modal_visible() {
        widgets::render_kill_dialog(f, f.area(), app);
    } else if app.show_help {
        widgets::render_help(f, f.area());
    }
}
