//! Health check payload.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Response body for `GET /health`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process can answer at all.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Jobs currently tracked in the registry.
    pub active_jobs: usize,
}

/// Build the health payload.
#[must_use]
pub fn health_check(start_time: Instant, active_jobs: usize) -> HealthResponse {
    HealthResponse {
        status: "ok".to_owned(),
        uptime_secs: start_time.elapsed().as_secs(),
        active_jobs,
    }
}
