//! Parallel node evaluation: all children run concurrently.

use std::collections::BTreeSet;

use crate::status::{Stater, Status};

use super::composite::Composite;
use super::{serial, sort_tasks, Tasks};

/// Union the ready sets of all children, walking attempts until one yields
/// work. Branch work only applies once no primary task remains, with one
/// exception: an Errored aggregate without an error branch returns nothing
/// at all -- it falls through to neither failure nor finally.
pub(crate) fn next(composite: &Composite, store: &dyn Stater) -> Tasks {
    let mut ready = Tasks::new();
    for attempt in 1..=composite.attempts {
        for child in &composite.children {
            ready.extend(child.next_at(store, attempt));
        }
        if !ready.is_empty() {
            break;
        }
    }

    let aggregate = aggregate(composite, store);

    if aggregate == Status::Success && ready.is_empty() {
        if let Some(branch) = &composite.branches.success {
            ready.extend(serial::next(branch, store));
        }
    }
    if aggregate == Status::Failed && ready.is_empty() {
        if let Some(branch) = &composite.branches.failure {
            ready.extend(serial::next(branch, store));
        }
    }
    if aggregate == Status::Errored {
        match &composite.branches.error {
            Some(branch) if ready.is_empty() => ready.extend(serial::next(branch, store)),
            _ => return Tasks::new(),
        }
    }
    if ready.is_empty() {
        if let Some(branch) = &composite.branches.finally {
            ready.extend(serial::next(branch, store));
        }
    }

    sort_tasks(&mut ready);
    composite.clamp(ready)
}

/// Aggregate the children per attempt, advancing only while the current
/// slice is fully terminal. Unanimity wins; otherwise Errored absorbs
/// everything (including Success), in-flight work reads as Running, and
/// Failed comes last.
pub(crate) fn aggregate(composite: &Composite, store: &dyn Stater) -> Status {
    if composite.children.is_empty() {
        return Status::Success;
    }

    let mut seen = BTreeSet::new();
    for attempt in 1..=composite.attempts {
        seen = composite
            .children
            .iter()
            .map(|child| child.state_at(store, attempt))
            .collect();
        if seen.contains(&Status::Unstarted) || seen.contains(&Status::Running) {
            break;
        }
    }

    if seen.len() == 1 {
        return *seen.iter().next().expect("non-empty status set");
    }
    if seen.contains(&Status::Errored) {
        Status::Errored
    } else if seen.contains(&Status::Unstarted) || seen.contains(&Status::Running) {
        Status::Running
    } else if seen.contains(&Status::Failed) {
        Status::Failed
    } else {
        Status::Running
    }
}
