//! Job-layer error taxonomy.

use vox_core::JobId;
use vox_inference::InferenceError;

/// Errors raised by the registry and executor.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The job id was never admitted or has already been cleaned up.
    #[error("task not found: {0}")]
    NotFound(JobId),

    /// A caller-supplied id collides with a live job.
    #[error("task id already in use: {0}")]
    AlreadyExists(JobId),

    /// Cancel was requested on a job with no cancellable handle.
    #[error("task {0} is not a cancellable background task")]
    NotCancellable(JobId),

    /// Diarization was requested but no diarization token is configured.
    #[error("missing diarization token")]
    MissingDiarizationToken,

    /// The speech backend failed.
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// A job ran to a `Failed` terminal state; the message is its
    /// recorded error description, re-raised to synchronous callers.
    #[error("{0}")]
    Execution(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_id() {
        let e = JobError::NotFound(JobId::from("abc"));
        assert!(e.to_string().contains("abc"));
    }

    #[test]
    fn inference_error_is_transparent() {
        let e = JobError::from(InferenceError::Backend("oom".into()));
        assert_eq!(e.to_string(), "inference backend error: oom");
    }

    #[test]
    fn execution_error_carries_message_verbatim() {
        let e = JobError::Execution("Task Cancelled".into());
        assert_eq!(e.to_string(), "Task Cancelled");
    }
}
