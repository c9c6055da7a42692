//! Best-effort webhook delivery.
//!
//! One POST per terminal job with a configured webhook. Delivery failure
//! (transport error or non-2xx) is logged and never escalated — the
//! job's own recorded state stays authoritative. No retries.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Value, json};
use tracing::{debug, warn};
use vox_core::JobId;

use crate::types::{JobOutcome, WebhookConfig};

/// Posts terminal results to caller-supplied callback URLs.
#[derive(Clone, Default)]
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a notifier with a fresh HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the notification payload for a terminal outcome.
    ///
    /// Always carries the job id so the receiver can correlate async
    /// completions; `machine_id` is included when this process knows it
    /// belongs to a specific fleet member.
    #[must_use]
    pub fn payload(id: &JobId, outcome: &JobOutcome, machine_id: Option<&str>) -> Value {
        let mut body = match outcome {
            JobOutcome::Completed(transcript) => json!({
                "status": "completed",
                "task_id": id,
                "output": transcript,
            }),
            JobOutcome::Failed(_) | JobOutcome::Cancelled => json!({
                "status": "error",
                "task_id": id,
                "error": outcome.error_message(),
            }),
        };
        if let (Some(machine_id), Some(map)) = (machine_id, body.as_object_mut()) {
            let _ = map.insert("machine_id".to_owned(), Value::from(machine_id));
        }
        body
    }

    /// Perform the single delivery attempt.
    pub async fn notify(
        &self,
        config: &WebhookConfig,
        id: &JobId,
        outcome: &JobOutcome,
        machine_id: Option<&str>,
    ) {
        let body = Self::payload(id, outcome, machine_id);
        let headers = build_headers(id, &config.header);

        let result = self
            .client
            .post(&config.url)
            .headers(headers)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(task_id = %id, url = %config.url, "webhook delivered");
            }
            Ok(response) => {
                warn!(
                    task_id = %id,
                    url = %config.url,
                    status = %response.status(),
                    "webhook delivery rejected"
                );
            }
            Err(e) => {
                warn!(task_id = %id, url = %config.url, error = %e, "webhook delivery failed");
            }
        }
    }
}

/// Convert the caller's header map, skipping entries that are not valid
/// HTTP header names/values.
fn build_headers(id: &JobId, raw: &std::collections::HashMap<String, String>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in raw {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                let _ = headers.insert(name, value);
            }
            _ => warn!(task_id = %id, header = %name, "skipping invalid webhook header"),
        }
    }
    headers
}
