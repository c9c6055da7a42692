//! Transcription output model and request enums.
//!
//! The wire shape mirrors what the speech backend produces: a full `text`
//! field plus timestamped `chunks`, and an optional `speakers` list merged
//! in when diarization runs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the model should do with the audio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Transcribe in the source language.
    #[default]
    Transcribe,
    /// Translate to English.
    Translate,
}

impl TaskKind {
    /// Wire-format name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transcribe => "transcribe",
            Self::Translate => "translate",
        }
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transcribe" => Ok(Self::Transcribe),
            "translate" => Ok(Self::Translate),
            other => Err(format!("unknown task: {other}")),
        }
    }
}

/// Granularity of returned timestamps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampGranularity {
    /// One timestamp per decoded chunk.
    #[default]
    Chunk,
    /// One timestamp per word.
    Word,
}

impl TimestampGranularity {
    /// Wire-format name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chunk => "chunk",
            Self::Word => "word",
        }
    }
}

impl FromStr for TimestampGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chunk" => Ok(Self::Chunk),
            "word" => Ok(Self::Word),
            other => Err(format!("unknown timestamp granularity: {other}")),
        }
    }
}

/// One timestamped span of transcribed text.
///
/// Boundary timestamps can be absent when the model could not place the
/// end of the final chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptChunk {
    /// Text of this span.
    pub text: String,
    /// `[start, end]` in seconds.
    pub timestamp: (Option<f64>, Option<f64>),
}

/// A transcript span attributed to one speaker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeakerSegment {
    /// Speaker label (e.g. `"SPEAKER_00"`).
    pub speaker: String,
    /// `[start, end]` in seconds.
    pub timestamp: (f64, f64),
    /// Text spoken in this segment.
    pub text: String,
}

/// Full result of transcribing one piece of audio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// The full transcribed (or translated) text.
    pub text: String,
    /// Timestamped spans at the requested granularity.
    pub chunks: Vec<TranscriptChunk>,
    /// Speaker-attributed segments, present only after diarization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speakers: Option<Vec<SpeakerSegment>>,
}
