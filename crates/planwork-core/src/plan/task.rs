//! The task leaf node.

use std::sync::Arc;

use crate::status::{Stater, Status};
use crate::task::Tasker;

use super::tree::Tree;
use super::Tasks;

pub(crate) struct TaskStep {
    task: Arc<dyn Tasker>,
}

impl TaskStep {
    pub(crate) fn new(task: Arc<dyn Tasker>) -> Self {
        Self { task }
    }

    /// Admission rule: once the history is at least `attempt` entries long,
    /// this attempt has already begun and the task must not be handed out
    /// again.
    pub(crate) fn next(&self, store: &dyn Stater, attempt: usize) -> Tasks {
        if store.get(self.task.id()).len() >= attempt {
            Tasks::new()
        } else {
            vec![Arc::clone(&self.task)]
        }
    }

    /// The status of the `attempt`-th slot. A history that exists but has
    /// not reached this attempt yet reads as Running: an earlier attempt is
    /// still in play from the caller's perspective.
    pub(crate) fn state(&self, store: &dyn Stater, attempt: usize) -> Status {
        let history = store.get(self.task.id());
        if history.len() >= attempt {
            history[attempt - 1]
        } else if !history.is_empty() {
            Status::Running
        } else {
            Status::Unstarted
        }
    }

    pub(crate) fn tree(&self) -> Tree {
        Tree::task(self.task.id())
    }
}
