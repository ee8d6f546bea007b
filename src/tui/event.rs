//! Keyboard mapping for the dashboard

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key action derived from key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Refresh every source now
    Refresh,
    /// Open the kill-switch confirmation
    OpenKill,
    /// Open the same confirmation from the lock hint
    OpenLock,
    /// Confirm the open prompt
    Confirm,
    /// Cancel the open prompt or dismiss an overlay
    Cancel,
    /// Select the next source card
    NextCard,
    /// Select the previous source card
    PrevCard,
    /// Toggle raw JSON on the selected card
    ToggleRaw,
    /// Show help
    Help,
    /// No action
    None,
}

impl From<KeyEvent> for KeyAction {
    fn from(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
            KeyCode::Char('q') => KeyAction::Quit,
            KeyCode::Char('r') => KeyAction::Refresh,
            KeyCode::Char('K') => KeyAction::OpenKill,
            KeyCode::Char('L') => KeyAction::OpenLock,
            KeyCode::Char('y') | KeyCode::Enter => KeyAction::Confirm,
            KeyCode::Char('n') | KeyCode::Esc => KeyAction::Cancel,
            KeyCode::Tab => KeyAction::NextCard,
            KeyCode::BackTab => KeyAction::PrevCard,
            KeyCode::Char('v') => KeyAction::ToggleRaw,
            KeyCode::Char('?') => KeyAction::Help,
            _ => KeyAction::None,
        }
    }
}
