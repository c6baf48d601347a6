//! A writer factory that funnels every task into two shared sinks.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use planwork_core::{TaskWriter, Tasker};

use super::WriterFactory;

type SharedSink = Arc<Mutex<Box<dyn Write + Send>>>;

/// All tasks write to the same stdout and stderr sinks, interleaved in
/// whatever order their workers produce output. Each admission is announced
/// on stderr with an `initializing <id>` line.
pub struct Console {
    stdout: SharedSink,
    stderr: SharedSink,
}

impl Console {
    pub fn new(stdout: impl Write + Send + 'static, stderr: impl Write + Send + 'static) -> Self {
        Self {
            stdout: Arc::new(Mutex::new(Box::new(stdout))),
            stderr: Arc::new(Mutex::new(Box::new(stderr))),
        }
    }

    /// Convenience constructor over the process's own stdio.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl WriterFactory for Console {
    fn get_writer(&self, task: &dyn Tasker) -> (TaskWriter, TaskWriter) {
        {
            let mut stderr = self.stderr.lock().expect("console sink poisoned");
            let _ = writeln!(stderr, "initializing {}", task.id());
        }
        (
            Box::new(SinkWriter(Arc::clone(&self.stdout))),
            Box::new(SinkWriter(Arc::clone(&self.stderr))),
        )
    }
}

struct SinkWriter(SharedSink);

impl Write for SinkWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("console sink poisoned").write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().expect("console sink poisoned").flush()
    }
}
