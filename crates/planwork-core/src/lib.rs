//! Composable task plans evaluated against a shared status store.
//!
//! A plan is an immutable tree of composition nodes -- task leaves, serial
//! and parallel composites with success/failure/error/finally branches,
//! retry budgets, in-flight limits, and `try` shields -- built through the
//! [`Planner`] callback API. Two pure queries drive everything:
//!
//! - [`Step::next`]: which atomic tasks are eligible to run right now.
//! - [`Step::state`]: the rolled-up status of the whole subtree.
//!
//! Both read a [`Stater`] snapshot and have no side effects; the only
//! mutable state in the system is the status store that task executions
//! write into. The `planwork-exec` crate provides the driver loop that
//! turns these queries into concurrent execution.

pub mod plan;
pub mod status;
pub mod task;

pub use plan::{NodeKind, Planner, Step, StepOptions, Tasks, Tree};
pub use status::{Stater, Status, StatusStore, TransitionError};
pub use task::{IntoTaskHandle, TaskWriter, Tasker};
