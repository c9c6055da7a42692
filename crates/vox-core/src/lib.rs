//! # vox-core
//!
//! Shared domain types for the vox transcription service:
//!
//! - [`JobId`]: branded identifier for a transcription job
//! - [`Transcript`] and friends: the transcription output model
//! - [`MediaSource`]: a resolved local-or-remote audio reference

#![deny(unsafe_code)]

pub mod ids;
pub mod media;
pub mod transcript;

pub use ids::JobId;
pub use media::MediaSource;
pub use transcript::{
    SpeakerSegment, TaskKind, TimestampGranularity, Transcript, TranscriptChunk,
};
