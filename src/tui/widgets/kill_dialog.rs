//! Kill-switch confirmation modal

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::adapters::endpoints::EXECUTOR_KILL_PATH;
use crate::safety::DialogPhase;
use crate::tui::app::DashboardApp;
use crate::tui::theme::THEME;

pub fn render_kill_dialog(f: &mut Frame, area: Rect, app: &DashboardApp) {
    let phase = app.dialog.phase();
    if phase == DialogPhase::Idle {
        return;
    }

    let mut lines = vec![
        Line::from(Span::styled(
            "Engage the executor kill switch?",
            THEME.title_style(),
        )),
        Line::from(Span::styled(
            format!("POST {}{}", app.base_url, EXECUTOR_KILL_PATH),
            THEME.inactive_style(),
        )),
        Line::raw(""),
    ];

    match phase {
        DialogPhase::Confirming => {
            if app.verdict.automation_locked {
                lines.push(Line::from(Span::styled(
                    "Automation is currently locked. Confirming will be refused.",
                    THEME.highlight_style(),
                )));
            }
            lines.push(Line::from(vec![
                Span::styled("[y]", THEME.highlight_style()),
                Span::raw(" confirm   "),
                Span::styled("[n]", THEME.highlight_style()),
                Span::raw(" cancel"),
            ]));
        }
        DialogPhase::Sending => {
            lines.push(Line::from(Span::styled(
                "Sending... (cancel disabled)",
                THEME.highlight_style(),
            )));
        }
        _ => {
            if let Some(outcome) = app.dialog.outcome() {
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", phase), THEME.outcome_style(outcome.status)),
                    Span::styled(outcome.detail.clone(), THEME.text_style()),
                ]));
            }
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                "[Enter] close",
                THEME.inactive_style(),
            )));
        }
    }

    let popup = centered_rect(60, 35, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Kill Switch ")
                .title_style(THEME.title_style())
                .border_style(THEME.border_style()),
        ),
        popup,
    );
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
    ])
    .split(vertical[1])[1]
}
