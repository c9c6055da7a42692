//! # vox-jobs
//!
//! The job orchestration core:
//!
//! - [`JobRegistry`]: process-wide table of job id → state/handle, with
//!   atomic admit/lookup/complete/cancel operations
//! - [`JobExecutor`]: runs one job to a terminal outcome (inference,
//!   optional diarization, temp cleanup, webhook, deregistration)
//! - [`WebhookNotifier`]: single best-effort result delivery
//!
//! Cancellation is advisory: cancelling removes the job from the
//! trackable set immediately and asks the underlying task to stop at its
//! next suspension point. Work that finishes anyway is logged as an
//! orphaned completion.

#![deny(unsafe_code)]

pub mod errors;
pub mod executor;
pub mod registry;
pub mod types;
pub mod webhook;

pub use errors::JobError;
pub use executor::JobExecutor;
pub use registry::{JobHandle, JobRegistry};
pub use types::{
    CANCELLED_MESSAGE, CancelOutcome, JobOutcome, JobSpec, JobState, JobView, WebhookConfig,
};
pub use webhook::WebhookNotifier;
