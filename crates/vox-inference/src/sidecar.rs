//! HTTP speech engine backed by a model-serving sidecar.
//!
//! The sidecar owns the accelerator and exposes two endpoints:
//! `POST /transcribe` and `POST /diarize`. This engine forwards the job
//! parameters as JSON and decodes the responses into the core types.
//! Non-2xx responses are surfaced as [`InferenceError::Backend`] with the
//! response body, so a model failure reads the same as it would locally.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use vox_core::{MediaSource, SpeakerSegment, Transcript};

use crate::engine::{SpeechEngine, TranscribeParams};
use crate::errors::InferenceError;

/// Speech engine that delegates to an HTTP sidecar.
pub struct SidecarEngine {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct TranscribeRequest<'a> {
    source: String,
    #[serde(flatten)]
    params: &'a TranscribeParams,
}

#[derive(Serialize)]
struct DiarizeRequest<'a> {
    source: String,
    token: &'a str,
    transcript: &'a Transcript,
}

impl SidecarEngine {
    /// Create an engine pointed at `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn post_json<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<reqwest::Response, InferenceError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, "posting to inference sidecar");
        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Backend(format!(
                "sidecar returned {status}: {body}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl SpeechEngine for SidecarEngine {
    async fn transcribe(
        &self,
        source: &MediaSource,
        params: &TranscribeParams,
    ) -> Result<Transcript, InferenceError> {
        let request = TranscribeRequest {
            source: source.reference(),
            params,
        };
        let response = self.post_json("transcribe", &request).await?;
        response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(format!("transcribe: {e}")))
    }

    async fn diarize(
        &self,
        token: &str,
        source: &MediaSource,
        transcript: &Transcript,
    ) -> Result<Vec<SpeakerSegment>, InferenceError> {
        let request = DiarizeRequest {
            source: source.reference(),
            token,
            transcript,
        };
        let response = self.post_json("diarize", &request).await?;
        response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(format!("diarize: {e}")))
    }
}
