//! Runs one job to a terminal outcome.
//!
//! Execution order, success or failure:
//!
//! 1. diarization precondition (fail before touching the model)
//! 2. transcribe, then optionally diarize, racing the cancellation token
//! 3. delete the job-owned temp artifact, if any (log-only on failure)
//! 4. webhook notification, if configured (single attempt)
//! 5. deregister: async jobs record their outcome for polling, sync jobs
//!    hand it straight back to the caller
//!
//! Access to the shared model is serialized through a semaphore sized to
//! the number of safely concurrent invocations (one per accelerator in
//! practice); the orchestrator itself never parallelizes inference.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vox_core::{JobId, Transcript};
use vox_inference::SpeechEngine;

use crate::errors::JobError;
use crate::registry::{JobHandle, JobRegistry};
use crate::types::{CANCELLED_MESSAGE, JobOutcome, JobSpec};
use crate::webhook::WebhookNotifier;

/// Executes jobs against the speech engine and reports their outcomes.
pub struct JobExecutor {
    engine: Arc<dyn SpeechEngine>,
    registry: Arc<JobRegistry>,
    notifier: WebhookNotifier,
    hf_token: Option<String>,
    machine_id: Option<String>,
    permits: Semaphore,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl JobExecutor {
    /// Create an executor.
    ///
    /// `max_concurrency` bounds how many inference calls may be in
    /// flight at once; 1 matches a single shared accelerator.
    #[must_use]
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        registry: Arc<JobRegistry>,
        hf_token: Option<String>,
        machine_id: Option<String>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            engine,
            registry,
            notifier: WebhookNotifier::new(),
            hf_token,
            machine_id,
            permits: Semaphore::new(max_concurrency.max(1)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Whether a diarization credential is configured.
    #[must_use]
    pub fn diarization_configured(&self) -> bool {
        self.hf_token.is_some()
    }

    /// Run an admitted job synchronously, blocking the caller until the
    /// terminal outcome is known.
    ///
    /// Cleanup and webhook notification always run; a `Failed` outcome is
    /// re-raised only afterwards, at this boundary.
    pub async fn run_sync(&self, id: &JobId, spec: JobSpec) -> Result<Transcript, JobError> {
        let outcome = self.execute(id, &spec, &CancellationToken::new()).await;
        self.finish(id, &spec, &outcome).await;
        self.registry.remove(id);

        match outcome {
            JobOutcome::Completed(transcript) => Ok(transcript),
            JobOutcome::Failed(message) => Err(JobError::Execution(message)),
            JobOutcome::Cancelled => Err(JobError::Execution(CANCELLED_MESSAGE.to_owned())),
        }
    }

    /// Run an admitted job in the background, returning immediately.
    ///
    /// The cancellation handle is attached before the task starts, so a
    /// cancel request can never miss the job.
    pub fn spawn(self: Arc<Self>, id: JobId, spec: JobSpec) {
        let token = CancellationToken::new();
        self.registry
            .attach_handle(&id, JobHandle::new(token.clone()));

        let executor = Arc::clone(&self);
        let task = tokio::spawn(async move {
            let outcome = executor.execute(&id, &spec, &token).await;
            executor.finish(&id, &spec, &outcome).await;
            let _ = executor.registry.complete(&id, outcome);
        });

        let mut tasks = self.tasks.lock();
        tasks.retain(|t| !t.is_finished());
        tasks.push(task);
    }

    /// Hand over the join handles of all spawned jobs.
    ///
    /// Called at shutdown so in-flight background work can be drained
    /// (cleanup and webhook delivery included) before the process exits.
    #[must_use]
    pub fn take_handles(&self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut *self.tasks.lock())
    }

    async fn execute(&self, id: &JobId, spec: &JobSpec, cancel: &CancellationToken) -> JobOutcome {
        self.registry.mark_running(id);
        debug!(
            task_id = %id,
            source = %spec.source.reference(),
            diarize = spec.diarize,
            "job running"
        );

        let outcome = tokio::select! {
            () = cancel.cancelled() => {
                info!(task_id = %id, "cancellation observed mid-flight");
                JobOutcome::Cancelled
            }
            result = self.run_inference(spec) => match result {
                Ok(transcript) => JobOutcome::Completed(transcript),
                Err(e) => {
                    error!(task_id = %id, error = %e, "job failed");
                    JobOutcome::Failed(e.to_string())
                }
            },
        };
        debug!(task_id = %id, state = ?outcome.state(), "job reached terminal state");
        outcome
    }

    async fn run_inference(&self, spec: &JobSpec) -> Result<Transcript, JobError> {
        if spec.diarize && self.hf_token.is_none() {
            return Err(JobError::MissingDiarizationToken);
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| JobError::Execution("inference pool closed".to_owned()))?;

        let mut transcript = self.engine.transcribe(&spec.source, &spec.params).await?;
        if spec.diarize {
            if let Some(token) = self.hf_token.as_deref() {
                let speakers = self
                    .engine
                    .diarize(token, &spec.source, &transcript)
                    .await?;
                transcript.speakers = Some(speakers);
            }
        }
        Ok(transcript)
    }

    /// Cleanup and notification, run for every terminal outcome.
    async fn finish(&self, id: &JobId, spec: &JobSpec, outcome: &JobOutcome) {
        if let Some(path) = spec.source.owned_path() {
            match tokio::fs::remove_file(path).await {
                Ok(()) => debug!(task_id = %id, path = %path.display(), "deleted temp artifact"),
                Err(e) => warn!(
                    task_id = %id,
                    path = %path.display(),
                    error = %e,
                    "failed to delete temp artifact"
                ),
            }
        }

        if let Some(webhook) = &spec.webhook {
            self.notifier
                .notify(webhook, id, outcome, self.machine_id.as_deref())
                .await;
        }
    }
}
