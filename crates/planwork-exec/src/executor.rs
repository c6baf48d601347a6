//! The driver loop: turns pure plan queries into concurrent execution.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use planwork_core::{Stater, Status, StatusStore, Step, Tasker, Tree};

use crate::writers::WriterFactory;

/// Fallback cadence for re-polling the plan. Workers signal the loop on
/// completion, so this only bounds the wait when nothing is in flight.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs a plan against a status store until its aggregate state is terminal.
///
/// The executor owns the only mutable piece of the system -- the store --
/// while the plan tree stays immutable and is queried repeatedly. Already
/// dispatched tasks are never cancelled; the driver waits for them.
pub struct Executor {
    plan: Step,
    writers: Arc<dyn WriterFactory>,
    store: Arc<dyn Stater>,
}

impl Executor {
    /// Create an executor with its own empty [`StatusStore`].
    pub fn new(plan: Step, writers: Arc<dyn WriterFactory>) -> Self {
        Self::with_store(plan, writers, Arc::new(StatusStore::new()))
    }

    /// Create an executor over an externally owned store, so other readers
    /// (a progress UI, for instance) can watch the same histories.
    pub fn with_store(plan: Step, writers: Arc<dyn WriterFactory>, store: Arc<dyn Stater>) -> Self {
        Self {
            plan,
            writers,
            store,
        }
    }

    /// The store this executor records into.
    pub fn store(&self) -> &Arc<dyn Stater> {
        &self.store
    }

    /// Structural snapshot of the plan being driven.
    pub fn tree(&self) -> Tree {
        self.plan.tree()
    }

    /// Drive the plan to completion and return its terminal status.
    ///
    /// Each ready task is admitted (a fresh Unstarted slot) and handed to
    /// its own worker. Admission or transition failures indicate a driver
    /// bug, not a task failure, so they are logged and dropped without
    /// taking the plan down.
    pub async fn run(&self) -> Status {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<()>();
        let mut in_flight: usize = 0;

        loop {
            let ready = self.plan.next(self.store.as_ref());
            let idle = ready.is_empty();

            for task in ready {
                if let Err(err) = self.store.add(task.id(), Status::Unstarted) {
                    warn!(task_id = %task.id(), error = %err, "could not admit task");
                    continue;
                }
                in_flight += 1;
                self.spawn_worker(task, done_tx.clone());
            }

            if idle {
                let state = self.plan.state(self.store.as_ref());
                if state.is_terminal() {
                    // Close intake and let in-flight work finish.
                    while in_flight > 0 {
                        match done_rx.recv().await {
                            Some(()) => in_flight -= 1,
                            None => break,
                        }
                    }
                    debug!(state = %state, "plan settled");
                    return state;
                }
            }

            if in_flight > 0 {
                tokio::select! {
                    done = done_rx.recv() => {
                        if done.is_some() {
                            in_flight -= 1;
                        }
                    }
                    _ = tokio::time::sleep(POLL_INTERVAL) => {}
                }
            } else {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }
    }

    fn spawn_worker(&self, task: Arc<dyn Tasker>, done: mpsc::UnboundedSender<()>) {
        let store = Arc::clone(&self.store);
        let writers = Arc::clone(&self.writers);

        tokio::spawn(async move {
            let (stdout, stderr) = writers.get_writer(task.as_ref());

            if let Err(err) = store.add(task.id(), Status::Running) {
                error!(task_id = %task.id(), error = %err, "could not move task to running");
                let _ = done.send(());
                return;
            }

            let outcome = match task.execute(stdout, stderr).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(task_id = %task.id(), error = %err, "task failed execution");
                    Status::Errored
                }
            };

            if let Err(err) = store.add(task.id(), outcome) {
                error!(task_id = %task.id(), status = %outcome, error = %err, "could not record task outcome");
            }
            let _ = done.send(());
        });
    }
}
