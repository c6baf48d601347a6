//! Task status values and the status store contract.
//!
//! A task's history is an ordered list of [`Status`] values: every element
//! but the last is the terminal outcome of an earlier attempt, and the last
//! element is the current status. The length of a history equals the number
//! of attempts that have at least begun.

mod store;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::StatusStore;

/// The status of a single task attempt.
///
/// Ordering matters to the evaluator: `Unstarted < Running` and both sort
/// before the terminal values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unstarted,
    Running,
    Success,
    Failed,
    Errored,
}

impl Status {
    /// Whether this status is a final attempt outcome.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Failed | Status::Errored)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Unstarted => "unstarted",
            Status::Running => "running",
            Status::Success => "success",
            Status::Failed => "failed",
            Status::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Errors returned by [`Stater::add`] when a recorded status would violate
/// the per-task state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{0} cannot be an initial state")]
    InvalidInitial(Status),

    #[error("cannot transition from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },
}

/// The status store contract.
///
/// The evaluator only ever reads through this trait, and the driver only
/// ever writes through it, so callers may substitute their own store (a UI
/// adapter polling progress holds the same handle the driver writes to).
pub trait Stater: Send + Sync {
    /// A copy of the status history for `id`; empty if the task has never
    /// been admitted.
    fn get(&self, id: &str) -> Vec<Status>;

    /// Record a status for `id`, subject to the state machine:
    ///
    /// ```text
    /// (empty)    + Unstarted                 => append
    /// Unstarted  + Running                   => replace tail
    /// Running    + Success/Failed/Errored    => replace tail
    /// terminal   + Unstarted                 => append (new attempt)
    /// ```
    ///
    /// Every other combination is rejected.
    fn add(&self, id: &str, status: Status) -> Result<(), TransitionError>;
}
