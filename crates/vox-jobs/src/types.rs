//! Job state machine and the value types flowing through it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vox_core::{MediaSource, Transcript};
use vox_inference::TranscribeParams;

/// Error string recorded when cooperative cancellation is observed
/// mid-execution.
pub const CANCELLED_MESSAGE: &str = "Task Cancelled";

/// Lifecycle state of a job.
///
/// `Queued → Running → {Completed | Failed | Cancelled}`; the last three
/// are terminal and never transition further.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Admitted, not yet executing.
    Queued,
    /// The executor has started calling the speech backend.
    Running,
    /// Inference (and optional diarization) succeeded.
    Completed,
    /// Inference, diarization, or an internal step failed.
    Failed,
    /// Cancellation was observed before or during execution.
    Cancelled,
}

impl JobState {
    /// Whether no further transitions can occur.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Caller-supplied callback for result delivery.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// URL to POST the terminal result to.
    pub url: String,
    /// Extra headers sent with the notification.
    #[serde(default)]
    pub header: HashMap<String, String>,
}

/// Everything the executor needs to run one job.
#[derive(Clone, Debug)]
pub struct JobSpec {
    /// Resolved audio reference.
    pub source: MediaSource,
    /// Model parameters.
    pub params: TranscribeParams,
    /// Whether to run speaker diarization after transcription.
    pub diarize: bool,
    /// Optional result callback.
    pub webhook: Option<WebhookConfig>,
}

/// Terminal outcome of a job, recorded exactly once.
#[derive(Clone, Debug, PartialEq)]
pub enum JobOutcome {
    /// The transcript (with speakers merged in when diarization ran).
    Completed(Transcript),
    /// Error description captured at the executor boundary.
    Failed(String),
    /// Cooperative cancellation observed mid-execution.
    Cancelled,
}

impl JobOutcome {
    /// The terminal state this outcome corresponds to.
    #[must_use]
    pub fn state(&self) -> JobState {
        match self {
            Self::Completed(_) => JobState::Completed,
            Self::Failed(_) => JobState::Failed,
            Self::Cancelled => JobState::Cancelled,
        }
    }

    /// The error description for non-success outcomes.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(msg) => Some(msg),
            Self::Cancelled => Some(CANCELLED_MESSAGE),
        }
    }
}

/// What a status query observes for a tracked job.
#[derive(Clone, Debug, PartialEq)]
pub enum JobView {
    /// Still live; no terminal result recorded yet.
    Processing,
    /// Terminal result, consumed from the registry by this lookup.
    Finished(JobOutcome),
}

/// Result of a cancellation request.
#[derive(Clone, Debug, PartialEq)]
pub enum CancelOutcome {
    /// Cancellation was requested and the job removed from the live set.
    Cancelled,
    /// The job had already finished; its recorded outcome is returned.
    AlreadyFinished(JobOutcome),
}
