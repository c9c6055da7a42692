//! Resolved audio references.
//!
//! A [`MediaSource`] is what the API surface hands to the job layer after
//! validating a submission: either a remote URL or a local file path. A
//! local path is `owned` when the server materialized it itself (an
//! uploaded file written to a temp location) — owned paths are deleted by
//! the executor after processing, caller-supplied paths never are.

use std::path::{Path, PathBuf};

/// A resolved local-or-remote audio reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaSource {
    /// Remote media fetched by the inference backend.
    Url(String),
    /// Local file on this machine.
    File {
        /// Path to the audio file.
        path: PathBuf,
        /// Whether the file is a job-private temp artifact we must delete.
        owned: bool,
    },
}

impl MediaSource {
    /// Build a source from a caller-supplied reference string.
    ///
    /// `http(s)` prefixes become [`MediaSource::Url`]; anything else is
    /// treated as a caller-supplied local path (never owned).
    #[must_use]
    pub fn from_reference(reference: &str) -> Self {
        if reference.to_ascii_lowercase().starts_with("http") {
            Self::Url(reference.to_owned())
        } else {
            Self::File {
                path: PathBuf::from(reference),
                owned: false,
            }
        }
    }

    /// The reference string handed to the inference backend.
    #[must_use]
    pub fn reference(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::File { path, .. } => path.to_string_lossy().into_owned(),
        }
    }

    /// The local path to delete after processing, if this job owns one.
    #[must_use]
    pub fn owned_path(&self) -> Option<&Path> {
        match self {
            Self::File { path, owned: true } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_reference_is_url() {
        let src = MediaSource::from_reference("https://x/a.wav");
        assert_eq!(src, MediaSource::Url("https://x/a.wav".into()));
        assert_eq!(src.reference(), "https://x/a.wav");
        assert!(src.owned_path().is_none());
    }

    #[test]
    fn http_prefix_is_case_insensitive() {
        let src = MediaSource::from_reference("HTTP://x/a.wav");
        assert!(matches!(src, MediaSource::Url(_)));
    }

    #[test]
    fn plain_path_is_unowned_file() {
        let src = MediaSource::from_reference("/tmp/a.wav");
        assert_eq!(
            src,
            MediaSource::File {
                path: PathBuf::from("/tmp/a.wav"),
                owned: false,
            }
        );
        assert!(src.owned_path().is_none());
    }

    #[test]
    fn owned_file_exposes_path() {
        let src = MediaSource::File {
            path: PathBuf::from("/tmp/upload.wav"),
            owned: true,
        };
        assert_eq!(src.owned_path(), Some(Path::new("/tmp/upload.wav")));
        assert_eq!(src.reference(), "/tmp/upload.wav");
    }
}
