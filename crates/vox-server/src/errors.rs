//! API error type and its HTTP mapping.
//!
//! Every error body is `{"detail": message}` with the status code
//! carrying the classification, so callers can branch on status alone.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vox_jobs::JobError;

/// Errors surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad or missing input; the job was never admitted.
    #[error("{0}")]
    Validation(String),

    /// Admin key missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// Unknown job id on status/cancel.
    #[error("{0}")]
    NotFound(String),

    /// Operation not valid for the job's current shape (e.g. cancelling
    /// a synchronous job).
    #[error("{0}")]
    InvalidOperation(String),

    /// Caller-supplied id collides with a live job.
    #[error("{0}")]
    Conflict(String),

    /// A required credential for the requested feature is not configured.
    #[error("{0}")]
    Config(String),

    /// Job execution failure re-raised to a synchronous caller, or an
    /// unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<JobError> for ApiError {
    fn from(e: JobError) -> Self {
        match e {
            JobError::NotFound(_) => Self::NotFound("Task not found".to_owned()),
            JobError::AlreadyExists(id) => {
                Self::Conflict(format!("Task id already in use: {id}"))
            }
            JobError::NotCancellable(_) => {
                Self::InvalidOperation("Not a background task".to_owned())
            }
            JobError::MissingDiarizationToken => {
                Self::Config("Missing diarization token".to_owned())
            }
            JobError::Inference(e) => Self::Internal(e.to_string()),
            JobError::Execution(message) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vox_core::JobId;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidOperation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Config("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Internal("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn job_errors_map_to_api_errors() {
        let e = ApiError::from(JobError::NotFound(JobId::from("x")));
        assert!(matches!(e, ApiError::NotFound(_)));
        assert_eq!(e.to_string(), "Task not found");

        let e = ApiError::from(JobError::AlreadyExists(JobId::from("dup")));
        assert!(matches!(e, ApiError::Conflict(_)));
        assert!(e.to_string().contains("dup"));

        let e = ApiError::from(JobError::NotCancellable(JobId::from("x")));
        assert!(matches!(e, ApiError::InvalidOperation(_)));

        let e = ApiError::from(JobError::MissingDiarizationToken);
        assert!(matches!(e, ApiError::Config(_)));

        let e = ApiError::from(JobError::Execution("boom".into()));
        assert!(matches!(e, ApiError::Internal(_)));
        assert_eq!(e.to_string(), "boom");
    }
}
