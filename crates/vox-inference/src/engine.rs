//! The [`SpeechEngine`] trait — the seam between job orchestration and
//! the model.
//!
//! The orchestration layer only ever sees two pure operations:
//! transcribe audio, and attribute a finished transcript to speakers.
//! Everything else (decoding, batching, devices) lives behind the trait.

use async_trait::async_trait;
use serde::Serialize;
use vox_core::{MediaSource, SpeakerSegment, TaskKind, TimestampGranularity, Transcript};

use crate::errors::InferenceError;

/// Parameters forwarded to the transcription model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TranscribeParams {
    /// Transcribe or translate.
    pub task: TaskKind,
    /// Language hint; `None` lets the model auto-detect.
    pub language: Option<String>,
    /// Inference batch size.
    pub batch_size: u32,
    /// Timestamp granularity of the returned chunks.
    pub timestamp: TimestampGranularity,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            task: TaskKind::Transcribe,
            language: None,
            batch_size: 64,
            timestamp: TimestampGranularity::Chunk,
        }
    }
}

/// Black-box speech backend: transcription plus diarization.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Transcribe the audio behind `source`.
    async fn transcribe(
        &self,
        source: &MediaSource,
        params: &TranscribeParams,
    ) -> Result<Transcript, InferenceError>;

    /// Attribute `transcript` to speakers.
    ///
    /// `token` is the diarization credential; the caller has already
    /// verified one is configured.
    async fn diarize(
        &self,
        token: &str,
        source: &MediaSource,
        transcript: &Transcript,
    ) -> Result<Vec<SpeakerSegment>, InferenceError>;
}
