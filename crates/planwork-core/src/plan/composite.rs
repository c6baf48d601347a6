//! Shared structure and status-combination rules for serial and parallel
//! nodes.

use std::collections::BTreeSet;

use crate::status::{Stater, Status};

use super::tree::{NodeKind, Tree};
use super::{serial, Step, Tasks};

/// A composite node: ordered children, optional branches, and the local
/// retry/throttle configuration. Serial and parallel variants share this
/// shape and differ only in evaluation.
pub(crate) struct Composite {
    pub(crate) children: Vec<Step>,
    pub(crate) branches: Branches,
    pub(crate) attempts: usize,
    pub(crate) max_in_flight: Option<usize>,
}

/// Auxiliary subplans attached to a composite. Each behaves like a serial
/// node over its own children and is only ever consulted by its parent.
#[derive(Default)]
pub(crate) struct Branches {
    pub(crate) success: Option<Box<Composite>>,
    pub(crate) failure: Option<Box<Composite>>,
    pub(crate) error: Option<Box<Composite>>,
    pub(crate) finally: Option<Box<Composite>>,
}

impl Branches {
    pub(crate) fn is_empty(&self) -> bool {
        self.success.is_none()
            && self.failure.is_none()
            && self.error.is_none()
            && self.finally.is_none()
    }
}

impl Composite {
    /// Apply the node's in-flight bound. Callers sort before clamping.
    pub(crate) fn clamp(&self, mut ready: Tasks) -> Tasks {
        if let Some(max) = self.max_in_flight {
            ready.truncate(max);
        }
        ready
    }

    pub(crate) fn tree(&self, kind: NodeKind) -> Tree {
        let mut children: Vec<Tree> = self.children.iter().map(Step::tree).collect();
        if let Some(branch) = &self.branches.success {
            children.push(branch.tree(NodeKind::Success));
        }
        if let Some(branch) = &self.branches.failure {
            children.push(branch.tree(NodeKind::Failure));
        }
        if let Some(branch) = &self.branches.error {
            children.push(branch.tree(NodeKind::Error));
        }
        if let Some(branch) = &self.branches.finally {
            children.push(branch.tree(NodeKind::Finally));
        }
        Tree::new(kind, None, children)
    }
}

/// Roll the child aggregate together with the success and finally branch
/// states into the node's public status.
///
/// A unanimous status wins, except that an all-Failed picture with a
/// failure branch still in flight reads as Running. A mixed picture is
/// Failed once Failed appears anywhere (held at Running until a configured
/// finally branch reaches a terminal state) and Running otherwise.
pub(crate) fn state(composite: &Composite, store: &dyn Stater, aggregate: Status) -> Status {
    let mut seen = BTreeSet::new();
    seen.insert(aggregate);
    if let Some(branch) = &composite.branches.success {
        seen.insert(branch_state(branch, store));
    }
    if let Some(branch) = &composite.branches.finally {
        seen.insert(branch_state(branch, store));
    }

    if seen.len() == 1 {
        let only = *seen.iter().next().expect("non-empty status set");
        if only == Status::Failed {
            if let Some(branch) = &composite.branches.failure {
                if branch_state(branch, store) <= Status::Running {
                    return Status::Running;
                }
            }
        }
        return only;
    }

    if seen.contains(&Status::Failed) {
        if let Some(branch) = &composite.branches.finally {
            if branch_state(branch, store) <= Status::Running {
                return Status::Running;
            }
        }
        return Status::Failed;
    }

    Status::Running
}

/// The public status of a branch, evaluated with serial semantics.
pub(crate) fn branch_state(branch: &Composite, store: &dyn Stater) -> Status {
    state(branch, store, serial::aggregate(branch, store))
}
