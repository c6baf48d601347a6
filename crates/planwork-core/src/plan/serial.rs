//! Serial node evaluation: children run left to right, one at a time.

use std::collections::BTreeSet;

use crate::status::{Stater, Status};

use super::composite::Composite;
use super::Tasks;

/// Walk the children per attempt. The first child that is neither done nor
/// failed dictates what runs next; a Failed or Errored child aborts the
/// attempt and, while the retry budget lasts, the walk restarts from the
/// first child against the next history slot. Once every child is Success
/// or the budget is spent, branch work takes over, emitted one task at a
/// time with the matching conditional branch ahead of finally.
pub(crate) fn next(composite: &Composite, store: &dyn Stater) -> Tasks {
    for attempt in 1..=composite.attempts {
        let mut failed = false;
        for child in &composite.children {
            match child.state_at(store, attempt) {
                Status::Success => continue,
                Status::Failed | Status::Errored => {
                    failed = true;
                    break;
                }
                _ => return composite.clamp(child.next_at(store, attempt)),
            }
        }
        if !failed {
            break;
        }
    }

    let aggregate = aggregate(composite, store);
    let mut ready = Tasks::new();
    if aggregate == Status::Success {
        if let Some(branch) = &composite.branches.success {
            ready.extend(next(branch, store));
        }
    }
    if aggregate == Status::Failed {
        if let Some(branch) = &composite.branches.failure {
            ready.extend(next(branch, store));
        }
    }
    if aggregate == Status::Errored {
        if let Some(branch) = &composite.branches.error {
            ready.extend(next(branch, store));
        }
    }
    if let Some(branch) = &composite.branches.finally {
        ready.extend(next(branch, store));
    }
    ready.truncate(1);
    ready
}

/// Aggregate the children per attempt: the first attempt on which all
/// children agree wins. When no attempt is unanimous the final attempt
/// decides, with Errored dominating Failed.
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
        if seen.len() == 1 {
            return *seen.iter().next().expect("non-empty status set");
        }
    }

    if seen.contains(&Status::Errored) {
        Status::Errored
    } else if seen.contains(&Status::Failed) {
        Status::Failed
    } else {
        Status::Running
    }
}
