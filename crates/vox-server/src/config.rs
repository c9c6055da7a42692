//! Server configuration.
//!
//! Compiled defaults with `VOX_*` environment overrides. Parsing is
//! strict: out-of-range or malformed values are silently ignored and the
//! default (or earlier override) stands.

use serde::{Deserialize, Serialize};

/// Configuration for the vox server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `8000`).
    pub port: u16,
    /// Admin API key; when set, every request must present it.
    pub admin_key: Option<String>,
    /// Diarization credential, required only for diarization jobs.
    pub hf_token: Option<String>,
    /// Fleet instance identifier echoed in responses and webhooks.
    pub machine_id: Option<String>,
    /// Base URL of the inference sidecar.
    pub engine_url: String,
    /// Safely concurrent model invocations (1 per accelerator).
    pub max_concurrency: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            admin_key: None,
            hf_token: None,
            machine_id: None,
            engine_url: "http://127.0.0.1:9000".into(),
            max_concurrency: 1,
        }
    }
}

impl ServerConfig {
    /// Load defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        apply_overrides(&mut config, |key| std::env::var(key).ok());
        config
    }
}

/// Apply `VOX_*` overrides from any string lookup.
///
/// Taking the lookup as a closure keeps the parsing rules testable
/// without mutating process environment.
pub fn apply_overrides<F>(config: &mut ServerConfig, get: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = read_string(&get, "VOX_HOST") {
        config.host = v;
    }
    if let Some(v) = read_u16(&get, "VOX_PORT") {
        config.port = v;
    }
    if let Some(v) = read_string(&get, "VOX_ADMIN_KEY") {
        config.admin_key = Some(v);
    }
    if let Some(v) = read_string(&get, "VOX_HF_TOKEN") {
        config.hf_token = Some(v);
    }
    if let Some(v) = read_string(&get, "VOX_MACHINE_ID") {
        config.machine_id = Some(v);
    }
    if let Some(v) = read_string(&get, "VOX_ENGINE_URL") {
        config.engine_url = v;
    }
    if let Some(v) = read_usize(&get, "VOX_MAX_CONCURRENCY", 1, 64) {
        config.max_concurrency = v;
    }
}

fn read_string<F: Fn(&str) -> Option<String>>(get: &F, key: &str) -> Option<String> {
    get(key).filter(|v| !v.is_empty())
}

fn read_u16<F: Fn(&str) -> Option<String>>(get: &F, key: &str) -> Option<u16> {
    get(key)?.parse().ok().filter(|v| *v > 0)
}

fn read_usize<F: Fn(&str) -> Option<String>>(
    get: &F,
    key: &str,
    min: usize,
    max: usize,
) -> Option<usize> {
    get(key)?.parse().ok().filter(|v| (min..=max).contains(v))
}
