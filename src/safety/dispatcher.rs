//! Gated kill-switch dispatcher
//!
//! The only code path allowed to POST to the kill or lock endpoints. A
//! [`KillRequest`] can only be obtained from [`KillSwitchDispatcher::begin`],
//! after the lock flag has been re-read, so nothing can send a kill without
//! passing the gate first.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::decision::SafetyVerdict;
use super::dialog::{ConfirmStep, KillDialog};
use crate::adapters::{Endpoints, HttpReply, StatusTransport};
use crate::domain::{ActionOutcome, ActionStatus, DashboardSnapshot, SourceKind};
use crate::error::ActionError;
use crate::services::RefreshHandle;

/// Max characters of server detail kept in a FAIL outcome
pub const DETAIL_LIMIT: usize = 200;

/// Source of the `automation_locked` flag at confirm time
pub trait LockGate {
    fn automation_locked(&self) -> bool;
}

impl LockGate for SafetyVerdict {
    fn automation_locked(&self) -> bool {
        self.automation_locked
    }
}

impl LockGate for DashboardSnapshot {
    fn automation_locked(&self) -> bool {
        SafetyVerdict::evaluate(self).automation_locked
    }
}

impl LockGate for watch::Receiver<DashboardSnapshot> {
    fn automation_locked(&self) -> bool {
        self.borrow().automation_locked()
    }
}

/// Result of a confirm keypress
#[derive(Debug)]
pub enum Confirmation {
    /// Gate closed. No request was made.
    Blocked(ActionOutcome),
    /// Gate open. Send the request, then hand the outcome to
    /// [`KillSwitchDispatcher::finish`].
    Dispatch(KillRequest),
    /// The dialog was not waiting for confirmation
    NotConfirming,
}

/// A kill request that has passed the gate
pub struct KillRequest {
    transport: Arc<dyn StatusTransport>,
    kill_url: String,
    lock_url: String,
}

impl KillRequest {
    /// POST the primary kill endpoint. On a 404, and only then, POST the lock
    /// endpoint once. Nothing is retried.
    pub async fn send(self) -> ActionOutcome {
        info!("Sending kill switch request to {}", self.kill_url);

        let reply = match self.transport.post_action(&self.kill_url).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Kill switch request failed: {}", e);
                return ActionOutcome::from(ActionError::Transport(e.0));
            }
        };

        if reply.status != 404 {
            return outcome_for(reply);
        }

        warn!(
            "Kill endpoint not found, falling back to {}",
            self.lock_url
        );
        match self.transport.post_action(&self.lock_url).await {
            Ok(reply) => outcome_for(reply),
            Err(e) => {
                error!("Lock fallback request failed: {}", e);
                ActionOutcome::from(ActionError::Transport(e.0))
            }
        }
    }
}

impl std::fmt::Debug for KillRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KillRequest")
            .field("kill_url", &self.kill_url)
            .field("lock_url", &self.lock_url)
            .finish()
    }
}

pub struct KillSwitchDispatcher {
    transport: Arc<dyn StatusTransport>,
    endpoints: Endpoints,
    refresh: Option<RefreshHandle>,
}

impl KillSwitchDispatcher {
    pub fn new(transport: Arc<dyn StatusTransport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            refresh: None,
        }
    }

    /// Ask the aggregator for an executor refresh after every terminal outcome
    pub fn with_refresh(mut self, refresh: RefreshHandle) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Resolve a confirm keypress, reading the gate at this instant.
    pub fn begin<G: LockGate + ?Sized>(&self, dialog: &mut KillDialog, gate: &G) -> Confirmation {
        match dialog.confirm(gate.automation_locked()) {
            ConfirmStep::Blocked(outcome) => {
                warn!("Kill switch blocked: {}", outcome.detail);
                self.request_executor_refresh();
                Confirmation::Blocked(outcome)
            }
            ConfirmStep::Send => Confirmation::Dispatch(KillRequest {
                transport: Arc::clone(&self.transport),
                kill_url: self.endpoints.kill_url(),
                lock_url: self.endpoints.lock_url(),
            }),
            ConfirmStep::Ignored => Confirmation::NotConfirming,
        }
    }

    /// Record the terminal outcome of a sent request and refresh the executor.
    pub fn finish(&self, dialog: &mut KillDialog, outcome: ActionOutcome) -> bool {
        match outcome.status {
            ActionStatus::Success => info!("Kill switch accepted: {}", outcome.detail),
            _ => warn!("Kill switch not accepted: {}", outcome.detail),
        }
        let recorded = dialog.complete(outcome);
        self.request_executor_refresh();
        recorded
    }

    /// Confirm, send and finish in one call. `None` when the dialog was not
    /// waiting for confirmation.
    pub async fn confirm<G: LockGate + ?Sized>(
        &self,
        dialog: &mut KillDialog,
        gate: &G,
    ) -> Option<ActionOutcome> {
        match self.begin(dialog, gate) {
            Confirmation::Blocked(outcome) => Some(outcome),
            Confirmation::Dispatch(request) => {
                let outcome = request.send().await;
                self.finish(dialog, outcome.clone());
                Some(outcome)
            }
            Confirmation::NotConfirming => None,
        }
    }

    fn request_executor_refresh(&self) {
        if let Some(refresh) = &self.refresh {
            if !refresh.refresh(SourceKind::Executor) {
                warn!("Executor refresh requested but the aggregator is gone");
            }
        }
    }
}

impl From<ActionError> for ActionOutcome {
    fn from(err: ActionError) -> Self {
        let (status, http_code) = match &err {
            ActionError::Blocked => (ActionStatus::Blocked, None),
            ActionError::Rejected { code, .. } => (ActionStatus::Failed, Some(*code)),
            ActionError::Transport(_) => (ActionStatus::Error, None),
        };
        ActionOutcome {
            status,
            http_code,
            detail: err.to_string(),
        }
    }
}

fn outcome_for(reply: HttpReply) -> ActionOutcome {
    if reply.is_success() {
        let body = reply.body.trim();
        if !body.is_empty() && reply.json().is_none() {
            let mut outcome = ActionOutcome::from(ActionError::Transport(format!(
                "unparsable response body (HTTP {})",
                reply.status
            )));
            outcome.http_code = Some(reply.status);
            return outcome;
        }
        return ActionOutcome {
            status: ActionStatus::Success,
            http_code: Some(reply.status),
            detail: format!("OK ({})", reply.status),
        };
    }

    ActionOutcome::from(ActionError::Rejected {
        code: reply.status,
        detail: truncate(&server_detail(&reply), DETAIL_LIMIT),
    })
}

/// `detail`, `error` or `message` from a JSON body, else the raw body
fn server_detail(reply: &HttpReply) -> String {
    let from_json = reply.json().and_then(|body| {
        ["detail", "error", "message"]
            .iter()
            .find_map(|key| match body.get(key) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
            })
    });

    let detail = from_json.unwrap_or_else(|| reply.body.trim().to_string());
    if detail.is_empty() {
        "(no detail)".to_string()
    } else {
        detail
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
