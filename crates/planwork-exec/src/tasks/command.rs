//! A task that runs a local subprocess.

use std::io::Write;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use planwork_core::{Status, TaskWriter, Tasker};

/// Runs `program` with `args`, streaming the child's output into the task
/// writers.
///
/// A non-zero exit -- or a process that could not be spawned at all -- is a
/// Failed attempt, never Errored: command failure is an outcome the plan
/// reacts to, not a fault in the driver.
pub struct LocalCommand {
    program: String,
    args: Vec<String>,
    id: String,
}

impl LocalCommand {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let program = program.into();
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let id = format!("command: {program} {}", args.join(" "));
        Self { program, args, id }
    }
}

/// Copy a child pipe into a task writer until EOF.
async fn pump(mut source: impl AsyncRead + Unpin, sink: &mut TaskWriter) -> std::io::Result<()> {
    let mut chunk = [0u8; 4096];
    loop {
        let read = source.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        sink.write_all(&chunk[..read])?;
    }
}

#[async_trait]
impl Tasker for LocalCommand {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, mut stdout: TaskWriter, mut stderr: TaskWriter) -> Result<Status> {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                let _ = writeln!(stderr, "could not spawn {}: {err}", self.program);
                return Ok(Status::Failed);
            }
        };

        let child_stdout = child.stdout.take().context("child stdout not piped")?;
        let child_stderr = child.stderr.take().context("child stderr not piped")?;

        let (stdout_copy, stderr_copy) = tokio::join!(
            pump(child_stdout, &mut stdout),
            pump(child_stderr, &mut stderr),
        );

        match child.wait().await {
            Ok(exit) if exit.success() && stdout_copy.is_ok() && stderr_copy.is_ok() => {
                Ok(Status::Success)
            }
            Ok(_) => Ok(Status::Failed),
            Err(err) => {
                let _ = writeln!(stderr, "could not wait for {}: {err}", self.program);
                Ok(Status::Failed)
            }
        }
    }
}
