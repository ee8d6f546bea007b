//! TUI Application state management
//!
//! Holds the latest published snapshot, the verdict derived from it and the
//! kill-switch dialog. Key handling is pure so it can be tested without a
//! terminal; side effects are returned as [`AppCommand`]s for the runner.

use std::time::Duration;

use crate::domain::{DashboardSnapshot, SourceKind};
use crate::safety::{DialogPhase, KillDialog, SafetyVerdict};
use crate::tui::event::KeyAction;

/// Side effect requested by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    None,
    Quit,
    Refresh,
    /// Resolve the confirmation through the dispatcher
    ConfirmKill,
}

/// TUI Application state
pub struct DashboardApp {
    /// Latest published snapshot
    pub snapshot: DashboardSnapshot,
    /// Derived from `snapshot` on every change
    pub verdict: SafetyVerdict,
    pub dialog: KillDialog,
    /// Index into [`SourceKind::ALL`]
    pub selected: usize,
    show_raw: [bool; 4],
    pub show_help: bool,
    pub running: bool,
    pub base_url: String,
    pub poll_interval: Duration,
}

impl DashboardApp {
    pub fn new(base_url: impl Into<String>, poll_interval: Duration) -> Self {
        let snapshot = DashboardSnapshot::default();
        Self {
            verdict: SafetyVerdict::evaluate(&snapshot),
            snapshot,
            dialog: KillDialog::new(),
            selected: 0,
            show_raw: [false; 4],
            show_help: false,
            running: true,
            base_url: base_url.into(),
            poll_interval,
        }
    }

    /// Check if app should continue running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Signal the app to quit
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn apply_snapshot(&mut self, snapshot: DashboardSnapshot) {
        self.verdict = SafetyVerdict::evaluate(&snapshot);
        self.snapshot = snapshot;
    }

    pub fn selected_kind(&self) -> SourceKind {
        SourceKind::ALL[self.selected % SourceKind::ALL.len()]
    }

    pub fn next_card(&mut self) {
        self.selected = (self.selected + 1) % SourceKind::ALL.len();
    }

    pub fn prev_card(&mut self) {
        if self.selected == 0 {
            self.selected = SourceKind::ALL.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn is_raw(&self, kind: SourceKind) -> bool {
        self.show_raw[Self::card_index(kind)]
    }

    pub fn toggle_raw(&mut self) {
        let idx = Self::card_index(self.selected_kind());
        self.show_raw[idx] = !self.show_raw[idx];
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// The kill modal is on screen, prompting or showing a result
    pub fn modal_visible(&self) -> bool {
        self.dialog.phase() != DialogPhase::Idle
    }

    fn card_index(kind: SourceKind) -> usize {
        SourceKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default()
    }

    pub fn handle_key(&mut self, action: KeyAction) -> AppCommand {
        // While the modal is open only confirm/dismiss keys apply.
        if self.modal_visible() {
            return self.handle_modal_key(action);
        }

        match action {
            KeyAction::Quit => {
                self.quit();
                AppCommand::Quit
            }
            KeyAction::Refresh => AppCommand::Refresh,
            KeyAction::OpenKill => {
                self.show_help = false;
                self.dialog.open();
                AppCommand::None
            }
            KeyAction::OpenLock => {
                if self.verdict.lock_recommended {
                    self.show_help = false;
                    self.dialog.open();
                }
                AppCommand::None
            }
            KeyAction::NextCard => {
                self.next_card();
                AppCommand::None
            }
            KeyAction::PrevCard => {
                self.prev_card();
                AppCommand::None
            }
            KeyAction::ToggleRaw => {
                self.toggle_raw();
                AppCommand::None
            }
            KeyAction::Help => {
                self.toggle_help();
                AppCommand::None
            }
            KeyAction::Cancel => {
                self.show_help = false;
                AppCommand::None
            }
            KeyAction::Confirm | KeyAction::None => AppCommand::None,
        }
    }

    fn handle_modal_key(&mut self, action: KeyAction) -> AppCommand {
        match (self.dialog.phase(), action) {
            (DialogPhase::Confirming, KeyAction::Confirm) => AppCommand::ConfirmKill,
            (DialogPhase::Confirming, KeyAction::Cancel) => {
                self.dialog.cancel();
                AppCommand::None
            }
            // cancel is disabled while the request is in flight
            (DialogPhase::Sending, _) => AppCommand::None,
            (phase, KeyAction::Confirm | KeyAction::Cancel) if phase.is_terminal() => {
                self.dialog.dismiss();
                AppCommand::None
            }
            _ => AppCommand::None,
        }
    }
}
