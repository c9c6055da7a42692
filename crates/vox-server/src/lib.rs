//! # vox-server
//!
//! Axum HTTP surface over the job orchestration core:
//!
//! - `POST /` — submit a transcription job (JSON or multipart upload)
//! - `GET /tasks` — snapshot of tracked job ids
//! - `GET /status/{task_id}` — poll a job
//! - `DELETE /cancel/{task_id}` — request cancellation
//! - `GET /health` — liveness and active job count
//!
//! Every route sits behind the admin-key middleware when a key is
//! configured. Graceful shutdown via `CancellationToken`.

#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod errors;
pub mod health;
pub mod media;
pub mod routes;
pub mod server;
pub mod shutdown;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ServerConfig;
pub use errors::ApiError;
pub use server::{AppState, VoxServer};
