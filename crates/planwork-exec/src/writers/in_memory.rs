//! A writer factory that captures all task output in memory.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use planwork_core::{TaskWriter, Tasker};

use super::WriterFactory;

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// One buffer per task id, shared between that task's stdout and stderr and
/// readable back at any time. Repeated admissions of the same task append
/// to the same buffer.
#[derive(Clone, Default)]
pub struct InMemory {
    buffers: Arc<Mutex<HashMap<String, SharedBuffer>>>,
}

impl InMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything the task has written so far; empty if it never ran.
    pub fn contents(&self, id: &str) -> String {
        let buffers = self.buffers.lock().expect("buffer map poisoned");
        match buffers.get(id) {
            Some(buffer) => {
                String::from_utf8_lossy(&buffer.lock().expect("buffer poisoned")).into_owned()
            }
            None => String::new(),
        }
    }

    fn buffer(&self, id: &str) -> SharedBuffer {
        let mut buffers = self.buffers.lock().expect("buffer map poisoned");
        Arc::clone(buffers.entry(id.to_string()).or_default())
    }
}

impl WriterFactory for InMemory {
    fn get_writer(&self, task: &dyn Tasker) -> (TaskWriter, TaskWriter) {
        let buffer = self.buffer(task.id());
        (
            Box::new(BufferWriter(Arc::clone(&buffer))),
            Box::new(BufferWriter(buffer)),
        )
    }
}

struct BufferWriter(SharedBuffer);

impl Write for BufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buffer poisoned").extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;

    use planwork_core::Status;

    use super::*;

    struct Probe(&'static str);

    #[async_trait]
    impl Tasker for Probe {
        fn id(&self) -> &str {
            self.0
        }

        async fn execute(&self, _stdout: TaskWriter, _stderr: TaskWriter) -> Result<Status> {
            Ok(Status::Success)
        }
    }

    #[test]
    fn stdout_and_stderr_share_one_buffer_per_task() {
        let factory = InMemory::new();
        let (mut stdout, mut stderr) = factory.get_writer(&Probe("A"));

        stdout.write_all(b"out\n").unwrap();
        stderr.write_all(b"err\n").unwrap();

        assert_eq!(factory.contents("A"), "out\nerr\n");
    }

    #[test]
    fn repeated_lookups_reuse_the_buffer() {
        let factory = InMemory::new();
        let (mut first, _) = factory.get_writer(&Probe("A"));
        first.write_all(b"one\n").unwrap();

        let (mut second, _) = factory.get_writer(&Probe("A"));
        second.write_all(b"two\n").unwrap();

        assert_eq!(factory.contents("A"), "one\ntwo\n");
    }

    #[test]
    fn tasks_do_not_share_buffers() {
        let factory = InMemory::new();
        let (mut a, _) = factory.get_writer(&Probe("A"));
        let (mut b, _) = factory.get_writer(&Probe("B"));

        a.write_all(b"from a\n").unwrap();
        b.write_all(b"from b\n").unwrap();

        assert_eq!(factory.contents("A"), "from a\n");
        assert_eq!(factory.contents("B"), "from b\n");
    }

    #[test]
    fn unknown_tasks_read_back_empty() {
        let factory = InMemory::new();
        assert_eq!(factory.contents("missing"), "");
    }
}
