//! The in-memory status store.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Stater, Status, TransitionError};

/// How a legal transition changes a history.
enum Effect {
    /// Push a new slot (a fresh attempt begins).
    Append,
    /// Overwrite the current slot in place (the attempt progresses).
    Replace,
}

/// The state-machine predicate, expressed over `(tail, incoming)` so it can
/// be checked without holding the store lock.
fn transition(tail: Option<Status>, incoming: Status) -> Result<Effect, TransitionError> {
    match (tail, incoming) {
        (None, Status::Unstarted) => Ok(Effect::Append),
        (None, other) => Err(TransitionError::InvalidInitial(other)),
        (Some(Status::Unstarted), Status::Running) => Ok(Effect::Replace),
        (Some(Status::Running), next) if next.is_terminal() => Ok(Effect::Replace),
        (Some(tail), Status::Unstarted) if tail.is_terminal() => Ok(Effect::Append),
        (Some(tail), next) => Err(TransitionError::InvalidTransition {
            from: tail,
            to: next,
        }),
    }
}

/// Mutex-guarded mapping from task id to status history.
#[derive(Debug, Default)]
pub struct StatusStore {
    histories: Mutex<HashMap<String, Vec<Status>>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stater for StatusStore {
    fn get(&self, id: &str) -> Vec<Status> {
        let histories = self.histories.lock().expect("status store poisoned");
        histories.get(id).cloned().unwrap_or_default()
    }

    fn add(&self, id: &str, status: Status) -> Result<(), TransitionError> {
        let mut histories = self.histories.lock().expect("status store poisoned");
        let history = histories.entry(id.to_string()).or_default();
        match transition(history.last().copied(), status)? {
            Effect::Append => history.push(status),
            Effect::Replace => *history.last_mut().expect("non-empty history") = status,
        }
        Ok(())
    }
}
