//! Ownership of independent job instances.

use super::transport::Transport;
use super::{spawn_job, JobCommand, JobEvent, RetryPolicy};
use crate::types::GenerationRequest;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Locally-assigned identifier for one visible result slot.
pub type JobId = u64;

/// Handle to a live job task.
pub struct JobHandle {
    id: JobId,
    commands: mpsc::UnboundedSender<JobCommand>,
    task: tokio::task::JoinHandle<()>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Send a user command to the job. Silently ignored once the job has
    /// ended; there is nothing left for the command to act on.
    pub fn send(&self, command: JobCommand) {
        let _ = self.commands.send(command);
    }
}

/// Owns zero or more independent job lifecycles.
///
/// There is no cross-job coordination beyond create and dispose: a batch
/// submission spawns N jobs that race freely and complete in any order.
pub struct JobRegistry {
    transport: Arc<dyn Transport>,
    jobs: HashMap<JobId, JobHandle>,
    next_id: JobId,
}

impl JobRegistry {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            jobs: HashMap::new(),
            next_id: 0,
        }
    }

    /// Spawn a new job for `params`.
    ///
    /// The returned receiver observes the job's events until disposal. The
    /// reference-image selection must already be resolved into `params`;
    /// retries inside the job reuse it as-is.
    pub fn spawn(
        &mut self,
        params: GenerationRequest,
        policy: RetryPolicy,
    ) -> (JobId, mpsc::UnboundedReceiver<JobEvent>) {
        let id = self.next_id;
        self.next_id += 1;

        let (commands, events, task) = spawn_job(self.transport.clone(), params, policy);
        self.jobs.insert(id, JobHandle { id, commands, task });
        tracing::debug!(job_id = id, "Spawned generation job");
        (id, events)
    }

    pub fn get(&self, id: JobId) -> Option<&JobHandle> {
        self.jobs.get(&id)
    }

    /// Dispose of a job: aborts its task, dropping every pending timer with
    /// it. An in-flight response, if it ever arrives, is discarded because
    /// nothing observes the job anymore.
    pub fn dispose(&mut self, id: JobId) {
        if let Some(handle) = self.jobs.remove(&id) {
            handle.task.abort();
            tracing::debug!(job_id = id, "Disposed generation job");
        }
    }

    /// Dispose of every job.
    pub fn dispose_all(&mut self) {
        let ids: Vec<JobId> = self.jobs.keys().copied().collect();
        for id in ids {
            self.dispose(id);
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
