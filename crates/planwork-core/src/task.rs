//! The `Tasker` trait -- the contract an atomic unit of work implements.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::status::Status;

/// Output sink handed to a task for its stdout or stderr.
pub type TaskWriter = Box<dyn Write + Send>;

/// An atomic unit of work.
///
/// Implementors are registered in a plan tree and executed by the driver.
/// The trait is object-safe so handles can be shared as `Arc<dyn Tasker>`
/// between the tree and in-flight workers.
#[async_trait]
pub trait Tasker: Send + Sync {
    /// Stable, unique identifier. The evaluator orders ready tasks by this
    /// id and the status store keys histories on it.
    fn id(&self) -> &str;

    /// Run the work, writing any output to the provided sinks.
    ///
    /// Return the terminal status of this attempt. An `Err` is recorded as
    /// [`Status::Errored`] regardless of anything else.
    async fn execute(&self, stdout: TaskWriter, stderr: TaskWriter) -> Result<Status>;
}

/// Conversion into a shared task handle, so builder callers can register
/// owned tasks and pre-shared `Arc`s through the same method.
pub trait IntoTaskHandle {
    fn into_task_handle(self) -> Arc<dyn Tasker>;
}

impl<T: Tasker + 'static> IntoTaskHandle for T {
    fn into_task_handle(self) -> Arc<dyn Tasker> {
        Arc::new(self)
    }
}

impl IntoTaskHandle for Arc<dyn Tasker> {
    fn into_task_handle(self) -> Arc<dyn Tasker> {
        self
    }
}

impl<T: Tasker + 'static> IntoTaskHandle for Arc<T> {
    fn into_task_handle(self) -> Arc<dyn Tasker> {
        self
    }
}
