//! Canonical per-source status records
//!
//! Every record is fully populated: fields the upstream did not report carry
//! [`Reported::Unknown`] (rendered `n/a`), `0`, `false` or an empty list.

use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder rendered for any value the upstream did not report
pub const NOT_AVAILABLE: &str = "n/a";

/// A reported value or the explicit `n/a` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Reported<T> {
    Known(T),
    #[default]
    Unknown,
}

impl<T> Reported<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Reported::Known(v) => Some(v),
            Reported::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Reported::Known(_))
    }
}

impl<T> From<Option<T>> for Reported<T> {
    fn from(value: Option<T>) -> Self {
        value.map(Reported::Known).unwrap_or(Reported::Unknown)
    }
}

impl<T: fmt::Display> fmt::Display for Reported<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reported::Known(v) => write!(f, "{v}"),
            Reported::Unknown => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl<T: Serialize> Serialize for Reported<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reported::Known(v) => v.serialize(serializer),
            Reported::Unknown => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

// ── Executor ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExecutorStatus {
    pub kill_switch: bool,
    pub fail_streak: u64,
    /// Code the executor itself last saw from its venue (payload field)
    pub last_http_code: Reported<u16>,
    pub last_event_id: Reported<String>,
    pub source_path: Reported<String>,
    pub ts_checked_iso: Reported<String>,
}

// ── Intent ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ItemEffects {
    pub deny: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ItemQuality {
    pub evidence_ok: bool,
    pub effects: ItemEffects,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IntentItem {
    pub symbol: Reported<String>,
    pub quality: ItemQuality,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IntentStatus {
    pub event_id: Reported<String>,
    pub ts_iso: Reported<String>,
    pub execution_mode: Reported<String>,
    pub dry_run: bool,
    pub error: Reported<String>,
    pub items: Vec<IntentItem>,
}

impl IntentStatus {
    /// Items whose quality effects deny execution
    pub fn deny_count(&self) -> usize {
        self.items.iter().filter(|i| i.quality.effects.deny).count()
    }

    /// Items without confirmed evidence
    pub fn evidence_bad_count(&self) -> usize {
        self.items.iter().filter(|i| !i.quality.evidence_ok).count()
    }
}

// ── Audit chain ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LedgerStatus {
    pub lines: Reported<u64>,
    pub last_hash: Reported<String>,
    pub schema_expected: Reported<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ChainStatus {
    pub execution_intent: LedgerStatus,
    pub paper_orders: LedgerStatus,
    pub paper_fills: LedgerStatus,
}

impl ChainStatus {
    pub fn ledgers(&self) -> [(&'static str, &LedgerStatus); 3] {
        [
            ("execution_intent", &self.execution_intent),
            ("paper_orders", &self.paper_orders),
            ("paper_fills", &self.paper_fills),
        ]
    }
}

// ── Risk regime ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RiskStatus {
    pub current_regime: Reported<String>,
    pub target_regime: Reported<String>,
    pub cooldown_remaining_ms: u64,
    pub reasons: Vec<String>,
    pub missing: Vec<String>,
}

// ── Banner ──────────────────────────────────────────────────────

/// Safety banner severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BannerLevel {
    Ok,
    Degraded,
    Halted,
}

impl BannerLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BannerLevel::Ok => "OK",
            BannerLevel::Degraded => "DEGRADED",
            BannerLevel::Halted => "HALTED",
        }
    }
}

impl fmt::Display for BannerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
}

impl Banner {
    pub fn ok() -> Self {
        Self {
            level: BannerLevel::Ok,
            message: String::new(),
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Degraded,
            message: message.into(),
        }
    }

    pub fn halted(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Halted,
            message: message.into(),
        }
    }
}

// ── Action outcome ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionStatus {
    Pending,
    Success,
    Failed,
    Error,
    Blocked,
}

impl ActionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ActionStatus::Pending)
    }
}

/// Result of one kill-switch attempt. Discarded on the next attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub status: ActionStatus,
    pub http_code: Option<u16>,
    pub detail: String,
}

impl ActionOutcome {
    pub fn pending() -> Self {
        Self {
            status: ActionStatus::Pending,
            http_code: None,
            detail: "sending...".to_string(),
        }
    }
}
