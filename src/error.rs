use thiserror::Error;

/// Main error type for the dashboard.
///
/// Per-source fetch and parse failures never surface here: they are absorbed
/// into [`crate::domain::SourceResult`] so the decision engine always runs on
/// defaulted data. This type covers startup, configuration and terminal plumbing.
#[derive(Error, Debug)]
pub enum DashError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Terminal errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for DashError
pub type Result<T> = std::result::Result<T, DashError>;

/// Terminal outcome failures of the kill-switch action.
///
/// Kept separate from [`DashError`] because these are rendered to the
/// operator verbatim rather than propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("automation locked (fail-closed)")]
    Blocked,

    #[error("FAIL ({code}): {detail}")]
    Rejected { code: u16, detail: String },

    #[error("ERROR: {0}")]
    Transport(String),
}
