//! A task that writes one line to each sink and reports a fixed status.

use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;

use planwork_core::{Status, TaskWriter, Tasker};

/// Writes its message to stdout and stderr, then finishes with the
/// configured status. Handy for demos and for exercising branch behavior
/// in tests.
pub struct Echo {
    message: String,
    outcome: Status,
}

impl Echo {
    pub fn new(message: impl Into<String>, outcome: Status) -> Self {
        Self {
            message: message.into(),
            outcome,
        }
    }
}

#[async_trait]
impl Tasker for Echo {
    fn id(&self) -> &str {
        &self.message
    }

    async fn execute(&self, mut stdout: TaskWriter, mut stderr: TaskWriter) -> Result<Status> {
        writeln!(stdout, "out: executing {}", self.message)?;
        writeln!(stderr, "err: executing {}", self.message)?;
        Ok(self.outcome)
    }
}
