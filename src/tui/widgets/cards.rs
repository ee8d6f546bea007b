//! Source cards: one bordered panel per status source
//!
//! Unhealthy sources keep their field labels but every value reads "n/a".
//! The raw toggle swaps the fields for the last payload.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{DashboardSnapshot, FetchPhase, SourceKind, NOT_AVAILABLE};
use crate::tui::app::DashboardApp;
use crate::tui::theme::THEME;

/// Render the four cards in a 2x2 grid
pub fn render_cards(f: &mut Frame, area: Rect, app: &DashboardApp) {
    let rows = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[0]);
    let bottom =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[1]);

    let cells = [top[0], top[1], bottom[0], bottom[1]];
    for (kind, cell) in SourceKind::ALL.into_iter().zip(cells) {
        render_card(f, cell, app, kind);
    }
}

fn render_card(f: &mut Frame, area: Rect, app: &DashboardApp, kind: SourceKind) {
    let snapshot = &app.snapshot;
    let selected = app.selected_kind() == kind;
    let healthy = snapshot.is_healthy(kind);

    let status = match (snapshot.phase(kind), snapshot.updated_at(kind)) {
        (FetchPhase::Fetching, _) => "…".to_string(),
        (_, None) => "waiting".to_string(),
        (_, Some(_)) => match snapshot.last_http_code(kind) {
            Some(code) => format!("HTTP {code}"),
            None => "no response".to_string(),
        },
    };

    let title = Line::from(vec![
        Span::styled(format!(" {} ", kind.title()), THEME.title_style()),
        Span::styled(if healthy { "● " } else { "○ " }, THEME.health_style(healthy)),
        Span::styled(format!("{status} "), THEME.inactive_style()),
    ]);

    let border = if selected {
        THEME.highlight_style()
    } else {
        THEME.border_style()
    };

    let mut lines: Vec<Line> = if app.is_raw(kind) {
        raw_json(snapshot, kind)
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), THEME.text_style())))
            .collect()
    } else {
        card_lines(snapshot, kind)
            .into_iter()
            .map(|(label, value)| {
                let style = if value == NOT_AVAILABLE {
                    THEME.inactive_style()
                } else {
                    THEME.text_style()
                };
                Line::from(vec![
                    Span::styled(format!("{label:<18}"), THEME.inactive_style()),
                    Span::styled(value, style),
                ])
            })
            .collect()
    };

    if let Some(error) = &snapshot.result(kind).error {
        lines.push(Line::from(Span::styled(
            format!("! {error}"),
            THEME.health_style(false),
        )));
    }
    if let Some(at) = snapshot.updated_at(kind) {
        let age = (Utc::now() - at).num_seconds().max(0);
        lines.push(Line::from(Span::styled(
            format!("updated {age}s ago"),
            THEME.inactive_style(),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border),
    );
    f.render_widget(paragraph, area);
}

/// Last payload, pretty-printed
pub fn raw_json(snapshot: &DashboardSnapshot, kind: SourceKind) -> String {
    snapshot
        .result(kind)
        .payload
        .as_ref()
        .and_then(|p| serde_json::to_string_pretty(p).ok())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Label/value pairs for a card's canonical view. Every value reads "n/a"
/// unless the source's latest fetch succeeded.
pub fn card_lines(snapshot: &DashboardSnapshot, kind: SourceKind) -> Vec<(&'static str, String)> {
    let lines = canonical_lines(snapshot, kind);
    if snapshot.is_healthy(kind) {
        return lines;
    }
    lines
        .into_iter()
        .map(|(label, _)| (label, NOT_AVAILABLE.to_string()))
        .collect()
}

fn canonical_lines(snapshot: &DashboardSnapshot, kind: SourceKind) -> Vec<(&'static str, String)> {
    match kind {
        SourceKind::Executor => {
            let e = &snapshot.executor.canonical;
            vec![
                ("kill_switch", e.kill_switch.to_string()),
                ("fail_streak", e.fail_streak.to_string()),
                ("last_http_code", e.last_http_code.to_string()),
                ("last_event_id", e.last_event_id.to_string()),
                ("source_path", e.source_path.to_string()),
                ("ts_checked", e.ts_checked_iso.to_string()),
            ]
        }
        SourceKind::Intent => {
            let i = &snapshot.intent.canonical;
            let mut lines = vec![
                ("event_id", i.event_id.to_string()),
                ("ts", i.ts_iso.to_string()),
                ("execution_mode", i.execution_mode.to_string()),
                ("dry_run", i.dry_run.to_string()),
                ("items", i.items.len().to_string()),
                ("deny", i.deny_count().to_string()),
                ("evidence_bad", i.evidence_bad_count().to_string()),
            ];
            if i.error.is_known() {
                lines.push(("error", i.error.to_string()));
            }
            for item in &i.items {
                let flags = match (item.quality.evidence_ok, item.quality.effects.deny) {
                    (true, false) => "ok",
                    (true, true) => "DENY",
                    (false, false) => "NO EVIDENCE",
                    (false, true) => "DENY, NO EVIDENCE",
                };
                lines.push(("  item", format!("{} [{}]", item.symbol, flags)));
            }
            lines
        }
        SourceKind::Chain => {
            let mut lines = Vec::new();
            for (name, ledger) in snapshot.chain.canonical.ledgers() {
                let count = match ledger.lines.known() {
                    Some(n) => format!("{n} lines"),
                    None => NOT_AVAILABLE.to_string(),
                };
                lines.push((name, count));
                lines.push(("  last_hash", short_hash(&ledger.last_hash.to_string())));
                if ledger.schema_expected.is_known() {
                    lines.push(("  schema", ledger.schema_expected.to_string()));
                }
            }
            lines
        }
        SourceKind::Risk => {
            let r = &snapshot.risk.canonical;
            vec![
                ("current_regime", r.current_regime.to_string()),
                ("target_regime", r.target_regime.to_string()),
                ("cooldown_ms", r.cooldown_remaining_ms.to_string()),
                ("reasons", join_or_na(&r.reasons)),
                ("missing", join_or_na(&r.missing)),
            ]
        }
    }
}

fn join_or_na(values: &[String]) -> String {
    if values.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        values.join(", ")
    }
}

fn short_hash(hash: &str) -> String {
    if hash.chars().count() > 16 {
        let head: String = hash.chars().take(16).collect();
        format!("{head}…")
    } else {
        hash.to_string()
    }
}
