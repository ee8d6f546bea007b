//! Fail-closed safety layer
//!
//! The decision engine derives the banner and lock flags from canonical
//! state. The dispatcher is the single gated path to the kill switch.

pub mod decision;
pub mod dialog;
pub mod dispatcher;

pub use decision::{automation_locked, decide, lock_recommended, SafetyVerdict};
pub use dialog::{ConfirmStep, DialogPhase, KillDialog};
pub use dispatcher::{Confirmation, KillRequest, KillSwitchDispatcher, LockGate};
