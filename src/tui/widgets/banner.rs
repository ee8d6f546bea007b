//! Safety banner widget
//!
//! One full-width line coloured by level, plus the lock state and the
//! advisory lock hint underneath.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::domain::BannerLevel;
use crate::tui::app::DashboardApp;
use crate::tui::theme::THEME;

/// Render the banner (2 lines tall)
pub fn render_banner(f: &mut Frame, area: Rect, app: &DashboardApp) {
    let verdict = &app.verdict;
    let banner = &verdict.banner;

    let headline = match banner.level {
        BannerLevel::Ok => " OK: executor reachable, automation unlocked ".to_string(),
        _ => format!(" {}: {} ", banner.level, banner.message),
    };

    let mut status = vec![Span::styled(
        if verdict.automation_locked {
            "  automation LOCKED"
        } else {
            "  automation unlocked"
        },
        THEME.health_style(!verdict.automation_locked),
    )];

    if verdict.lock_recommended {
        status.push(Span::styled(
            format!(
                "   LOCK RECOMMENDED (deny={}, evidence_bad={}, fail_streak={})  press L",
                verdict.deny_count,
                verdict.evidence_bad_count,
                app.snapshot.executor.canonical.fail_streak
            ),
            THEME.highlight_style(),
        ));
    }

    let lines = vec![
        Line::from(Span::styled(headline, THEME.banner_style(banner.level))),
        Line::from(status),
    ];
    f.render_widget(Paragraph::new(lines), area);
}
