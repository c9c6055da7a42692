//! # vox-inference
//!
//! The inference adapter: wraps the speech model and the diarization
//! routine behind the [`SpeechEngine`] trait so the job layer never
//! touches model internals.
//!
//! The shipped implementation, [`SidecarEngine`], talks to a
//! model-serving sidecar over HTTP.

#![deny(unsafe_code)]

pub mod engine;
pub mod errors;
pub mod sidecar;

pub use engine::{SpeechEngine, TranscribeParams};
pub use errors::InferenceError;
pub use sidecar::SidecarEngine;
