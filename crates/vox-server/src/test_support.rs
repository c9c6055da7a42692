//! Shared fixtures for router tests: a controllable fake engine and
//! ready-wired app state.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use vox_core::{MediaSource, SpeakerSegment, Transcript, TranscriptChunk};
use vox_inference::{InferenceError, SpeechEngine, TranscribeParams};

use crate::config::ServerConfig;
use crate::server::{AppState, VoxServer};

/// Engine double: optional delay, optional failure, call counts.
#[derive(Default)]
pub struct FakeEngine {
    pub delay: Option<Duration>,
    pub fail_with: Option<String>,
    pub transcribe_calls: AtomicUsize,
    pub diarize_calls: AtomicUsize,
}

#[async_trait]
impl SpeechEngine for FakeEngine {
    async fn transcribe(
        &self,
        _source: &MediaSource,
        _params: &TranscribeParams,
    ) -> Result<Transcript, InferenceError> {
        let _ = self
            .transcribe_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.fail_with {
            return Err(InferenceError::Backend(message.clone()));
        }
        Ok(Transcript {
            text: "hello world".into(),
            chunks: vec![TranscriptChunk {
                text: "hello world".into(),
                timestamp: (Some(0.0), Some(1.0)),
            }],
            speakers: None,
        })
    }

    async fn diarize(
        &self,
        _token: &str,
        _source: &MediaSource,
        transcript: &Transcript,
    ) -> Result<Vec<SpeakerSegment>, InferenceError> {
        let _ = self
            .diarize_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(vec![SpeakerSegment {
            speaker: "SPEAKER_00".into(),
            timestamp: (0.0, 1.0),
            text: transcript.text.clone(),
        }])
    }
}

/// Build app state around a fake engine.
pub fn state_with(config: ServerConfig, engine: FakeEngine) -> AppState {
    VoxServer::new(config, Arc::new(engine)).state()
}

/// Router with default config and a well-behaved engine.
pub fn test_router() -> Router {
    router_with(ServerConfig::default(), FakeEngine::default())
}

/// Router over explicit config and engine.
pub fn router_with(config: ServerConfig, engine: FakeEngine) -> Router {
    crate::server::build_router(state_with(config, engine))
}
