//! Inference error type.

/// Errors that can occur while calling the speech backend.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The backend rejected the request or failed mid-inference.
    #[error("inference backend error: {0}")]
    Backend(String),

    /// Transport-level failure reaching the backend.
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a payload we could not decode.
    #[error("invalid inference response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        let e = InferenceError::Backend("cuda out of memory".into());
        assert!(e.to_string().contains("cuda out of memory"));
    }

    #[test]
    fn invalid_response_display() {
        let e = InferenceError::InvalidResponse("missing text field".into());
        assert!(e.to_string().contains("missing text field"));
    }
}
