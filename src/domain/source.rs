//! Polled sources and the per-source slots owned by the aggregator

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::status::{ChainStatus, ExecutorStatus, IntentStatus, RiskStatus};

/// The four independently failing status sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Intent,
    Chain,
    Executor,
    Risk,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Intent,
        SourceKind::Chain,
        SourceKind::Executor,
        SourceKind::Risk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Intent => "intent",
            SourceKind::Chain => "audit_chain",
            SourceKind::Executor => "executor",
            SourceKind::Risk => "risk_regime",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SourceKind::Intent => "Intent",
            SourceKind::Chain => "Audit Chain",
            SourceKind::Executor => "Executor",
            SourceKind::Risk => "Risk Regime",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one bounded GET against a status source.
///
/// A non-2xx status is a completed transport carrying an error code, not a
/// transport failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SourceResult {
    /// Parsed body; `None` if absent, unparsable or the status was not 2xx
    pub payload: Option<Value>,
    /// Observed status code; `None` before the first poll or on transport failure
    pub http_status: Option<u16>,
    /// The request could not complete (DNS, refused, timeout)
    pub transport_failed: bool,
    /// Short description of what went wrong, for logs and tooltips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceResult {
    /// State of a source that has never been polled
    pub fn not_polled() -> Self {
        Self::default()
    }

    pub fn received(status: u16, payload: Option<Value>) -> Self {
        Self {
            payload,
            http_status: Some(status),
            transport_failed: false,
            error: None,
        }
    }

    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            payload: None,
            http_status: None,
            transport_failed: true,
            error: Some(message.into()),
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        !self.transport_failed && matches!(self.http_status, Some(code) if (200..300).contains(&code))
    }

    /// Payload eligible for normalization
    pub fn usable_payload(&self) -> Option<&Value> {
        if self.is_success() {
            self.payload.as_ref()
        } else {
            None
        }
    }
}

/// Per-source fetch state machine: `Idle -> Fetching -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FetchPhase {
    Idle,
    Fetching,
}

/// How the last settled fetch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FetchOutcome {
    Success,
    Error,
}

/// Latest known state of one source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSlot<T> {
    pub phase: FetchPhase,
    pub outcome: Option<FetchOutcome>,
    pub result: SourceResult,
    pub canonical: T,
    /// Most recent status code actually received; survives transport failures
    pub last_http_code: Option<u16>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Fetches started but not yet settled
    #[serde(skip)]
    in_flight: u32,
}

impl<T: Default> Default for SourceSlot<T> {
    fn default() -> Self {
        Self {
            phase: FetchPhase::Idle,
            outcome: None,
            result: SourceResult::not_polled(),
            canonical: T::default(),
            last_http_code: None,
            updated_at: None,
            in_flight: 0,
        }
    }
}

impl<T> SourceSlot<T> {
    pub fn begin_fetch(&mut self) {
        self.in_flight += 1;
        self.phase = FetchPhase::Fetching;
    }

    /// Replace the slot with a freshly settled result. Never merges with the
    /// previous payload.
    pub fn settle(&mut self, result: SourceResult, canonical: T, at: DateTime<Utc>) {
        if let Some(code) = result.http_status {
            self.last_http_code = Some(code);
        }
        self.outcome = Some(if result.is_success() && result.payload.is_some() {
            FetchOutcome::Success
        } else {
            FetchOutcome::Error
        });
        // Overlapping polls: stay Fetching until the last one lands
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.phase = FetchPhase::Idle;
        }
        self.result = result;
        self.canonical = canonical;
        self.updated_at = Some(at);
    }

    /// Whether the card should show canonical values rather than `n/a`
    pub fn is_healthy(&self) -> bool {
        self.outcome == Some(FetchOutcome::Success)
    }
}

/// Everything the aggregator publishes after each settle
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardSnapshot {
    pub intent: SourceSlot<IntentStatus>,
    pub chain: SourceSlot<ChainStatus>,
    pub executor: SourceSlot<ExecutorStatus>,
    pub risk: SourceSlot<RiskStatus>,
}

impl DashboardSnapshot {
    /// Executor link as seen by the latest settle. `None` means unreachable:
    /// never polled, or the latest request failed at the transport layer.
    pub fn observed_executor_code(&self) -> Option<u16> {
        let result = &self.executor.result;
        if result.transport_failed {
            None
        } else {
            result.http_status
        }
    }

    pub fn phase(&self, kind: SourceKind) -> FetchPhase {
        match kind {
            SourceKind::Intent => self.intent.phase,
            SourceKind::Chain => self.chain.phase,
            SourceKind::Executor => self.executor.phase,
            SourceKind::Risk => self.risk.phase,
        }
    }

    pub fn is_healthy(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Intent => self.intent.is_healthy(),
            SourceKind::Chain => self.chain.is_healthy(),
            SourceKind::Executor => self.executor.is_healthy(),
            SourceKind::Risk => self.risk.is_healthy(),
        }
    }

    pub fn result(&self, kind: SourceKind) -> &SourceResult {
        match kind {
            SourceKind::Intent => &self.intent.result,
            SourceKind::Chain => &self.chain.result,
            SourceKind::Executor => &self.executor.result,
            SourceKind::Risk => &self.risk.result,
        }
    }

    pub fn last_http_code(&self, kind: SourceKind) -> Option<u16> {
        match kind {
            SourceKind::Intent => self.intent.last_http_code,
            SourceKind::Chain => self.chain.last_http_code,
            SourceKind::Executor => self.executor.last_http_code,
            SourceKind::Risk => self.risk.last_http_code,
        }
    }

    pub fn updated_at(&self, kind: SourceKind) -> Option<DateTime<Utc>> {
        match kind {
            SourceKind::Intent => self.intent.updated_at,
            SourceKind::Chain => self.chain.updated_at,
            SourceKind::Executor => self.executor.updated_at,
            SourceKind::Risk => self.risk.updated_at,
        }
    }

    /// Oldest settle time across sources, `None` until every source settled once
    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        SourceKind::ALL
            .iter()
            .map(|k| self.updated_at(*k))
            .collect::<Option<Vec<_>>>()
            .and_then(|times| times.into_iter().min())
    }
}
