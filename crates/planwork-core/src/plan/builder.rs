//! The callback builder used to construct plan trees.

use anyhow::{Context, Result};

use crate::task::IntoTaskHandle;

use super::composite::{Branches, Composite};
use super::task::TaskStep;
use super::{Node, Step, StepOptions};

/// Receiver handed to plan-building closures.
///
/// ```
/// use planwork_core::{Step, StepOptions, StatusStore};
/// # use planwork_core::{Status, TaskWriter, Tasker};
/// # use async_trait::async_trait;
/// # struct Noop(&'static str);
/// # #[async_trait]
/// # impl Tasker for Noop {
/// #     fn id(&self) -> &str { self.0 }
/// #     async fn execute(&self, _: TaskWriter, _: TaskWriter) -> anyhow::Result<Status> {
/// #         Ok(Status::Success)
/// #     }
/// # }
/// # fn main() -> anyhow::Result<()> {
/// let plan = Step::serial(|plan| {
///     plan.task(Noop("build"));
///     plan.parallel_with(StepOptions::default().max_in_flight(2), |plan| {
///         plan.task(Noop("unit-tests"));
///         plan.task(Noop("lint"));
///         Ok(())
///     })?;
///     plan.failure(|plan| {
///         plan.task(Noop("notify"));
///         Ok(())
///     })?;
///     Ok(())
/// })?;
///
/// let store = StatusStore::new();
/// assert_eq!(plan.next(&store)[0].id(), "build");
/// # Ok(())
/// # }
/// ```
pub struct Planner {
    steps: Vec<Step>,
    branches: Branches,
    attempts: usize,
    max_in_flight: Option<usize>,
}

impl Planner {
    fn new(options: StepOptions) -> Self {
        Self {
            steps: Vec::new(),
            branches: Branches::default(),
            attempts: options.attempts,
            max_in_flight: options.max_in_flight,
        }
    }

    fn into_composite(self) -> Composite {
        Composite {
            children: self.steps,
            branches: self.branches,
            attempts: self.attempts,
            max_in_flight: self.max_in_flight,
        }
    }

    /// Register an atomic task as the next child.
    pub fn task(&mut self, task: impl IntoTaskHandle) {
        self.steps.push(Step {
            node: Node::Task(TaskStep::new(task.into_task_handle())),
        });
    }

    /// Nest a serial composite as the next child.
    pub fn serial(&mut self, build: impl FnOnce(&mut Planner) -> Result<()>) -> Result<()> {
        self.serial_with(StepOptions::default(), build)
    }

    pub fn serial_with(
        &mut self,
        options: StepOptions,
        build: impl FnOnce(&mut Planner) -> Result<()>,
    ) -> Result<()> {
        let composite = compose(options, build).context("could not create serial step")?;
        self.steps.push(Step {
            node: Node::Serial(composite),
        });
        Ok(())
    }

    /// Nest a parallel composite as the next child.
    pub fn parallel(&mut self, build: impl FnOnce(&mut Planner) -> Result<()>) -> Result<()> {
        self.parallel_with(StepOptions::default(), build)
    }

    pub fn parallel_with(
        &mut self,
        options: StepOptions,
        build: impl FnOnce(&mut Planner) -> Result<()>,
    ) -> Result<()> {
        let composite = compose(options, build).context("could not create parallel step")?;
        self.steps.push(Step {
            node: Node::Parallel(composite),
        });
        Ok(())
    }

    /// Nest a try shield: failure of the wrapped subtree reads as success.
    ///
    /// (`try` itself is a reserved word, hence `try_step`.)
    pub fn try_step(&mut self, build: impl FnOnce(&mut Planner) -> Result<()>) -> Result<()> {
        let composite = compose(StepOptions::default(), build).context("could not create try step")?;
        self.steps.push(Step {
            node: Node::Try(Box::new(single_child(composite))),
        });
        Ok(())
    }

    /// Attach the branch that runs when every child succeeds.
    pub fn success(&mut self, build: impl FnOnce(&mut Planner) -> Result<()>) -> Result<()> {
        let composite = compose(StepOptions::default(), build).context("could not create success step")?;
        self.branches.success = Some(Box::new(composite));
        Ok(())
    }

    /// Attach the branch that runs when the composite fails.
    pub fn failure(&mut self, build: impl FnOnce(&mut Planner) -> Result<()>) -> Result<()> {
        let composite = compose(StepOptions::default(), build).context("could not create failure step")?;
        self.branches.failure = Some(Box::new(composite));
        Ok(())
    }

    /// Attach the branch that runs when the composite errors.
    pub fn error(&mut self, build: impl FnOnce(&mut Planner) -> Result<()>) -> Result<()> {
        let composite = compose(StepOptions::default(), build).context("could not create error step")?;
        self.branches.error = Some(Box::new(composite));
        Ok(())
    }

    /// Attach the branch that always runs once the composite settles.
    pub fn finally(&mut self, build: impl FnOnce(&mut Planner) -> Result<()>) -> Result<()> {
        let composite = compose(StepOptions::default(), build).context("could not create finally step")?;
        self.branches.finally = Some(Box::new(composite));
        Ok(())
    }
}

/// Run a build closure against a fresh receiver. An error from the closure
/// aborts construction; callers add the composite-kind prefix.
pub(crate) fn compose(
    options: StepOptions,
    build: impl FnOnce(&mut Planner) -> Result<()>,
) -> Result<Composite> {
    let mut planner = Planner::new(options);
    build(&mut planner)?;
    Ok(planner.into_composite())
}

/// A try node wraps exactly one child. Bodies that register several steps
/// or attach branches get an implicit serial composite around them.
fn single_child(mut composite: Composite) -> Step {
    if composite.children.len() == 1 && composite.branches.is_empty() {
        composite.children.pop().expect("exactly one child")
    } else {
        Step {
            node: Node::Serial(composite),
        }
    }
}
