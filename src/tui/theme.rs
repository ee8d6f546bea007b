//! Theme and color definitions for the TUI dashboard
//!
//! Cyan borders, with green, yellow and red keyed to banner severity.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{ActionStatus, BannerLevel};

/// Theme configuration for the dashboard
#[derive(Debug, Clone)]
pub struct Theme {
    /// Border color (cyan)
    pub border: Color,
    /// Title color
    pub title: Color,
    /// OK banner and healthy sources
    pub ok: Color,
    /// DEGRADED banner
    pub degraded: Color,
    /// HALTED banner and failed sources
    pub halted: Color,
    /// Highlight/accent color (yellow)
    pub highlight: Color,
    /// Inactive/dim color
    pub inactive: Color,
    /// Normal text color
    pub text: Color,
    /// Background color
    pub bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Color::Cyan,
            title: Color::Cyan,
            ok: Color::Green,
            degraded: Color::Yellow,
            halted: Color::Red,
            highlight: Color::Yellow,
            inactive: Color::DarkGray,
            text: Color::White,
            bg: Color::Reset,
        }
    }
}

impl Theme {
    /// Get style for borders
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Get style for titles
    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    /// Get style for highlighted text
    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    /// Get style for inactive/dim text
    pub fn inactive_style(&self) -> Style {
        Style::default().fg(self.inactive)
    }

    /// Get style for normal text
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    /// Banner bar: coloured background, bold text
    pub fn banner_style(&self, level: BannerLevel) -> Style {
        let bg = match level {
            BannerLevel::Ok => self.ok,
            BannerLevel::Degraded => self.degraded,
            BannerLevel::Halted => self.halted,
        };
        Style::default()
            .fg(Color::Black)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Source health marker
    pub fn health_style(&self, healthy: bool) -> Style {
        if healthy {
            Style::default().fg(self.ok)
        } else {
            Style::default().fg(self.halted)
        }
    }

    pub fn outcome_style(&self, status: ActionStatus) -> Style {
        let fg = match status {
            ActionStatus::Pending => self.highlight,
            ActionStatus::Success => self.ok,
            ActionStatus::Blocked => self.degraded,
            ActionStatus::Failed | ActionStatus::Error => self.halted,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }
}

/// Global theme instance
pub static THEME: std::sync::LazyLock<Theme> = std::sync::LazyLock::new(Theme::default);
