//! The plan tree: composition nodes and their `next`/`state` evaluation.
//!
//! A [`Step`] is an immutable tree built once through the [`Planner`]
//! callback API. Evaluation is pure: [`Step::next`] and [`Step::state`] read
//! a status store snapshot and never mutate anything, so they can be
//! re-queried freely while tasks execute.
//!
//! Internally every node answers `next_at`/`state_at` with an attempt hint.
//! Task leaves use the hint to pick the history slot that represents the
//! caller's current retry iteration; `try` wrappers pass it through; serial
//! and parallel composites ignore it and run their own attempt loop over
//! their configured retry budget.

mod builder;
mod composite;
mod parallel;
mod serial;
mod task;
mod tree;

use std::sync::Arc;

use anyhow::Result;

use crate::status::{Stater, Status};
use crate::task::Tasker;

use composite::Composite;
use task::TaskStep;

pub use builder::Planner;
pub use tree::{NodeKind, Tree};

/// Ready tasks returned by [`Step::next`], ordered by task id.
pub type Tasks = Vec<Arc<dyn Tasker>>;

/// Per-composite configuration.
///
/// ```
/// use planwork_core::StepOptions;
///
/// let options = StepOptions::default().attempts(2).max_in_flight(4);
/// # let _ = options;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StepOptions {
    attempts: usize,
    max_in_flight: Option<usize>,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            attempts: 1,
            max_in_flight: None,
        }
    }
}

impl StepOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the composite re-exposes its children after a failed
    /// attempt. Clamped to at least 1.
    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Upper bound on the number of tasks the composite hands out at once.
    pub fn max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = Some(max);
        self
    }
}

/// One node of a plan tree.
pub struct Step {
    pub(crate) node: Node,
}

pub(crate) enum Node {
    Task(TaskStep),
    Serial(Composite),
    Parallel(Composite),
    Try(Box<Step>),
}

impl Step {
    /// Build a serial root: children run left to right.
    pub fn serial(build: impl FnOnce(&mut Planner) -> Result<()>) -> Result<Step> {
        Self::serial_with(StepOptions::default(), build)
    }

    pub fn serial_with(
        options: StepOptions,
        build: impl FnOnce(&mut Planner) -> Result<()>,
    ) -> Result<Step> {
        let composite = builder::compose(options, build)?;
        Ok(Step {
            node: Node::Serial(composite),
        })
    }

    /// Build a parallel root: children run concurrently.
    pub fn parallel(build: impl FnOnce(&mut Planner) -> Result<()>) -> Result<Step> {
        Self::parallel_with(StepOptions::default(), build)
    }

    pub fn parallel_with(
        options: StepOptions,
        build: impl FnOnce(&mut Planner) -> Result<()>,
    ) -> Result<Step> {
        let composite = builder::compose(options, build)?;
        Ok(Step {
            node: Node::Parallel(composite),
        })
    }

    /// The tasks currently eligible to run, ordered by task id with
    /// duplicates removed. Never returns a task whose current attempt has
    /// already been admitted.
    pub fn next(&self, store: &dyn Stater) -> Tasks {
        let mut ready = self.next_at(store, 1);
        sort_tasks(&mut ready);
        ready
    }

    /// The rolled-up status of this subtree.
    pub fn state(&self, store: &dyn Stater) -> Status {
        self.state_at(store, 1)
    }

    /// Read-only structural snapshot for UI adapters.
    pub fn tree(&self) -> Tree {
        match &self.node {
            Node::Task(task) => task.tree(),
            Node::Serial(composite) => composite.tree(NodeKind::Serial),
            Node::Parallel(composite) => composite.tree(NodeKind::Parallel),
            Node::Try(child) => Tree::new(NodeKind::Try, None, vec![child.tree()]),
        }
    }

    pub(crate) fn next_at(&self, store: &dyn Stater, attempt: usize) -> Tasks {
        match &self.node {
            Node::Task(task) => task.next(store, attempt),
            Node::Serial(composite) => serial::next(composite, store),
            Node::Parallel(composite) => parallel::next(composite, store),
            Node::Try(child) => child.next_at(store, attempt),
        }
    }

    pub(crate) fn state_at(&self, store: &dyn Stater, attempt: usize) -> Status {
        match &self.node {
            Node::Task(task) => task.state(store, attempt),
            Node::Serial(composite) => {
                composite::state(composite, store, serial::aggregate(composite, store))
            }
            Node::Parallel(composite) => {
                composite::state(composite, store, parallel::aggregate(composite, store))
            }
            // A try shield masks failure of the wrapped subtree. Errors pass
            // through untouched.
            Node::Try(child) => match child.state_at(store, attempt) {
                Status::Failed => Status::Success,
                other => other,
            },
        }
    }
}

pub(crate) fn sort_tasks(tasks: &mut Tasks) {
    tasks.sort_by(|a, b| a.id().cmp(b.id()));
    tasks.dedup_by(|a, b| a.id() == b.id());
}
