//! Media resolution: turn a submission's `url` or uploaded file into a
//! single validated [`MediaSource`].
//!
//! URL takes priority; an upload is only processed when no URL was
//! given. Uploads are materialized to a temp file (keeping the original
//! extension so the backend can sniff the container format) and marked
//! owned so the executor deletes them after processing.

use tracing::debug;
use vox_core::MediaSource;

use crate::errors::ApiError;

/// Validate a caller-supplied reference and build its [`MediaSource`].
///
/// Anything `http(s)`-prefixed is accepted as a remote URL; everything
/// else must be an existing local path.
pub fn resolve_reference(reference: &str) -> Result<MediaSource, ApiError> {
    let source = MediaSource::from_reference(reference);
    if let MediaSource::File { path, .. } = &source {
        if !path.exists() {
            return Err(ApiError::Validation("Invalid URL or file path".to_owned()));
        }
    }
    Ok(source)
}

/// Write an uploaded file to a job-owned temp path.
pub async fn persist_upload(
    file_name: Option<&str>,
    data: &[u8],
) -> Result<MediaSource, ApiError> {
    let suffix = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| format!(".{ext}"))
        .unwrap_or_default();

    let file = tempfile::Builder::new()
        .prefix("vox-upload-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| ApiError::Internal(format!("Failed to store upload: {e}")))?;
    let path = file
        .into_temp_path()
        .keep()
        .map_err(|e| ApiError::Internal(format!("Failed to store upload: {e}")))?;

    tokio::fs::write(&path, data)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to store upload: {e}")))?;

    debug!(path = %path.display(), bytes = data.len(), "materialized upload");
    Ok(MediaSource::File { path, owned: true })
}
