//! Kill-switch confirmation state machine
//!
//! `Idle -> Confirming -> (Blocked | Sending) -> (Succeeded | Failed | Errored) -> Idle`
//!
//! Opening the prompt is purely local. The lock re-check happens at confirm
//! time, never at open time. Cancel is refused while a request is in flight.

use serde::Serialize;
use std::fmt;

use crate::domain::{ActionOutcome, ActionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DialogPhase {
    Idle,
    Confirming,
    Blocked,
    Sending,
    Succeeded,
    Failed,
    Errored,
}

impl DialogPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogPhase::Idle => "IDLE",
            DialogPhase::Confirming => "CONFIRMING",
            DialogPhase::Blocked => "BLOCKED",
            DialogPhase::Sending => "SENDING",
            DialogPhase::Succeeded => "SUCCEEDED",
            DialogPhase::Failed => "FAILED",
            DialogPhase::Errored => "ERRORED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DialogPhase::Blocked | DialogPhase::Succeeded | DialogPhase::Failed | DialogPhase::Errored
        )
    }

    /// Check if this phase can transition to another phase
    pub fn can_transition_to(&self, target: DialogPhase) -> bool {
        use DialogPhase::*;

        match (self, target) {
            (Idle, Confirming) => true,

            (Confirming, Blocked) => true,
            (Confirming, Sending) => true,
            (Confirming, Idle) => true, // cancel

            (Sending, Succeeded) => true,
            (Sending, Failed) => true,
            (Sending, Errored) => true,

            (from, Idle) if from.is_terminal() => true,

            _ => false,
        }
    }

    fn for_outcome(status: ActionStatus) -> DialogPhase {
        match status {
            ActionStatus::Pending => DialogPhase::Sending,
            ActionStatus::Success => DialogPhase::Succeeded,
            ActionStatus::Failed => DialogPhase::Failed,
            ActionStatus::Error => DialogPhase::Errored,
            ActionStatus::Blocked => DialogPhase::Blocked,
        }
    }
}

impl fmt::Display for DialogPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a confirm keypress resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmStep {
    /// Gate was closed; terminal outcome recorded, no request made
    Blocked(ActionOutcome),
    /// Gate was open; the caller must send exactly one kill request
    Send,
    /// The dialog was not waiting for confirmation
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillDialog {
    phase: DialogPhase,
    outcome: Option<ActionOutcome>,
}

impl Default for KillDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl KillDialog {
    pub fn new() -> Self {
        Self {
            phase: DialogPhase::Idle,
            outcome: None,
        }
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    /// Outcome of the current or most recent attempt
    pub fn outcome(&self) -> Option<&ActionOutcome> {
        self.outcome.as_ref()
    }

    /// A request is in flight
    pub fn is_busy(&self) -> bool {
        self.phase == DialogPhase::Sending
    }

    /// The prompt is on screen
    pub fn is_prompt_open(&self) -> bool {
        matches!(self.phase, DialogPhase::Confirming | DialogPhase::Sending)
    }

    fn transition(&mut self, target: DialogPhase) -> bool {
        if self.phase.can_transition_to(target) {
            self.phase = target;
            true
        } else {
            false
        }
    }

    /// Open the prompt. A previous terminal outcome is discarded.
    pub fn open(&mut self) -> bool {
        if self.phase.is_terminal() {
            self.transition(DialogPhase::Idle);
        }
        if self.transition(DialogPhase::Confirming) {
            self.outcome = None;
            true
        } else {
            false
        }
    }

    /// Dismiss the prompt. Refused while sending.
    pub fn cancel(&mut self) -> bool {
        match self.phase {
            DialogPhase::Confirming => self.transition(DialogPhase::Idle),
            _ => false,
        }
    }

    /// Close a finished attempt. The outcome stays readable until the next open.
    pub fn dismiss(&mut self) -> bool {
        self.phase.is_terminal() && self.transition(DialogPhase::Idle)
    }

    /// Resolve a confirm with the lock flag read at this instant.
    pub fn confirm(&mut self, automation_locked: bool) -> ConfirmStep {
        if self.phase != DialogPhase::Confirming {
            return ConfirmStep::Ignored;
        }

        if automation_locked {
            let outcome = ActionOutcome {
                status: ActionStatus::Blocked,
                http_code: None,
                detail: crate::error::ActionError::Blocked.to_string(),
            };
            self.transition(DialogPhase::Blocked);
            self.outcome = Some(outcome.clone());
            return ConfirmStep::Blocked(outcome);
        }

        self.transition(DialogPhase::Sending);
        self.outcome = Some(ActionOutcome::pending());
        ConfirmStep::Send
    }

    /// Record the terminal outcome of an in-flight request.
    pub fn complete(&mut self, outcome: ActionOutcome) -> bool {
        let target = DialogPhase::for_outcome(outcome.status);
        if self.phase == DialogPhase::Sending && self.transition(target) {
            self.outcome = Some(outcome);
            true
        } else {
            false
        }
    }
}
