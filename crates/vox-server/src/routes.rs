//! Request handlers.
//!
//! Submission accepts either a JSON body or a multipart form (the form
//! is how files arrive); both funnel into the same [`SubmitRequest`]
//! shape and the same admission path. All validation happens before the
//! job is admitted, so a rejected request never leaves a registry entry
//! behind.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};
use vox_core::{JobId, TaskKind, TimestampGranularity};
use vox_inference::TranscribeParams;
use vox_jobs::{CancelOutcome, JobOutcome, JobSpec, JobView, WebhookConfig};

use crate::errors::ApiError;
use crate::health;
use crate::media;
use crate::server::AppState;

/// Largest accepted request body (JSON or upload), 50 MB.
pub const MAX_BODY_SIZE: usize = 50 * 1024 * 1024;

fn default_language() -> String {
    "auto".to_owned()
}

fn default_batch_size() -> u32 {
    64
}

/// Submission fields, shared by the JSON and multipart paths.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Remote media URL or caller-visible local path.
    #[serde(default)]
    pub url: Option<String>,
    /// Transcribe or translate.
    #[serde(default)]
    pub task: TaskKind,
    /// Language hint; `"auto"` (or `"None"`) disables it.
    #[serde(default = "default_language")]
    pub language: String,
    /// Inference batch size, must be positive.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Timestamp granularity.
    #[serde(default)]
    pub timestamp: TimestampGranularity,
    /// Run speaker diarization after transcription.
    #[serde(default)]
    pub diarise_audio: bool,
    /// Result callback.
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
    /// Defer execution and return a job id immediately.
    #[serde(default)]
    pub is_async: bool,
    /// Caller-supplied job id.
    #[serde(default)]
    pub managed_task_id: Option<String>,
}

impl Default for SubmitRequest {
    fn default() -> Self {
        Self {
            url: None,
            task: TaskKind::default(),
            language: default_language(),
            batch_size: default_batch_size(),
            timestamp: TimestampGranularity::default(),
            diarise_audio: false,
            webhook: None,
            is_async: false,
            managed_task_id: None,
        }
    }
}

struct Upload {
    file_name: Option<String>,
    data: Vec<u8>,
}

/// `POST /` — submit a transcription job.
pub async fn submit(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<Value>, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let (body, upload) = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid multipart request: {e}")))?;
        parse_multipart(multipart).await?
    } else {
        let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read request body: {e}")))?;
        let body = if bytes.is_empty() {
            SubmitRequest::default()
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Validation(format!("Invalid request body: {e}")))?
        };
        (body, None)
    };

    submit_job(&state, body, upload).await.map(Json)
}

async fn parse_multipart(
    mut multipart: Multipart,
) -> Result<(SubmitRequest, Option<Upload>), ApiError> {
    let mut body = SubmitRequest::default();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart field: {e}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "file" {
            let file_name = field.file_name().map(str::to_owned);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read upload: {e}")))?;
            upload = Some(Upload {
                file_name,
                data: data.to_vec(),
            });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid field '{name}': {e}")))?;
        match name.as_str() {
            "url" => body.url = Some(text),
            "task" => body.task = text.parse().map_err(ApiError::Validation)?,
            "language" => body.language = text,
            "batch_size" => {
                body.batch_size = text.parse().map_err(|_| {
                    ApiError::Validation("batch_size must be a positive integer".to_owned())
                })?;
            }
            "timestamp" => body.timestamp = text.parse().map_err(ApiError::Validation)?,
            "diarise_audio" => body.diarise_audio = parse_bool(&name, &text)?,
            "is_async" => body.is_async = parse_bool(&name, &text)?,
            "webhook" => {
                body.webhook = Some(serde_json::from_str(&text).map_err(|e| {
                    ApiError::Validation(format!("Invalid webhook field: {e}"))
                })?);
            }
            "managed_task_id" => body.managed_task_id = Some(text),
            other => debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    Ok((body, upload))
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ApiError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ApiError::Validation(format!("{name} must be a boolean"))),
    }
}

/// `"auto"` and the literal `"None"` disable the language hint.
fn language_hint(language: &str) -> Option<String> {
    if language.eq_ignore_ascii_case("auto") || language == "None" {
        None
    } else {
        Some(language.to_owned())
    }
}

async fn submit_job(
    state: &AppState,
    body: SubmitRequest,
    upload: Option<Upload>,
) -> Result<Value, ApiError> {
    if body.batch_size == 0 {
        return Err(ApiError::Validation(
            "batch_size must be positive".to_owned(),
        ));
    }
    if body.diarise_audio && !state.executor.diarization_configured() {
        return Err(ApiError::Config("Missing diarization token".to_owned()));
    }
    if body.is_async && body.webhook.is_none() {
        return Err(ApiError::Validation(
            "Webhook is required for async tasks".to_owned(),
        ));
    }

    // URL wins; the upload is only processed when no URL was given.
    let source = match body.url.as_deref().filter(|url| !url.is_empty()) {
        Some(reference) => media::resolve_reference(reference)?,
        None => match upload {
            Some(upload) => media::persist_upload(upload.file_name.as_deref(), &upload.data).await?,
            None => {
                return Err(ApiError::Validation(
                    "Either URL or file must be provided".to_owned(),
                ));
            }
        },
    };

    let requested = body.managed_task_id.clone().map(JobId::from_string);
    let id = match state.registry.admit(requested) {
        Ok(id) => id,
        Err(e) => {
            // Admission failed after we may have materialized an upload.
            if let Some(path) = source.owned_path() {
                let _ = tokio::fs::remove_file(path).await;
            }
            return Err(e.into());
        }
    };

    let spec = JobSpec {
        source,
        params: TranscribeParams {
            task: body.task,
            language: language_hint(&body.language),
            batch_size: body.batch_size,
            timestamp: body.timestamp,
        },
        diarize: body.diarise_audio,
        webhook: body.webhook,
    };

    info!(
        task_id = %id,
        is_async = body.is_async,
        diarize = spec.diarize,
        "job admitted"
    );

    if body.is_async {
        Arc::clone(&state.executor).spawn(id.clone(), spec);
        Ok(with_machine_id(
            json!({
                "status": "processing",
                "task_id": id,
                "detail": "Task is being processed in the background",
            }),
            state,
        ))
    } else {
        let output = state.executor.run_sync(&id, spec).await.map_err(ApiError::from)?;
        Ok(with_machine_id(
            json!({
                "status": "completed",
                "task_id": id,
                "output": output,
            }),
            state,
        ))
    }
}

fn with_machine_id(mut body: Value, state: &AppState) -> Value {
    if let (Some(machine_id), Some(map)) = (&state.config.machine_id, body.as_object_mut()) {
        let _ = map.insert("machine_id".to_owned(), Value::from(machine_id.clone()));
    }
    body
}

fn terminal_body(outcome: &JobOutcome) -> Value {
    match outcome {
        JobOutcome::Completed(transcript) => json!({
            "status": "completed",
            "output": transcript,
        }),
        JobOutcome::Failed(_) | JobOutcome::Cancelled => json!({
            "status": "error",
            "error": outcome.error_message(),
        }),
    }
}

/// `GET /tasks` — snapshot of tracked job ids, admission order.
pub async fn tasks(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "tasks": state.registry.list_ids() }))
}

/// `GET /status/{task_id}` — poll a job; a terminal result is consumed.
pub async fn status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = JobId::from_string(task_id);
    match state.registry.lookup(&id)? {
        JobView::Processing => Ok(Json(json!({ "status": "processing" }))),
        JobView::Finished(outcome) => Ok(Json(terminal_body(&outcome))),
    }
}

/// `DELETE /cancel/{task_id}` — request cancellation of a background job.
pub async fn cancel(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = JobId::from_string(task_id);
    match state.registry.cancel(&id)? {
        CancelOutcome::Cancelled => Ok(Json(json!({ "status": "cancelled" }))),
        CancelOutcome::AlreadyFinished(outcome) => Ok(Json(terminal_body(&outcome))),
    }
}

/// `GET /health`.
pub async fn health_handler(State(state): State<AppState>) -> Json<health::HealthResponse> {
    Json(health::health_check(state.start_time, state.registry.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_hint_disabling_values() {
        assert_eq!(language_hint("auto"), None);
        assert_eq!(language_hint("AUTO"), None);
        assert_eq!(language_hint("None"), None);
        assert_eq!(language_hint("fr"), Some("fr".to_owned()));
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("f", "true").unwrap());
        assert!(parse_bool("f", "1").unwrap());
        assert!(parse_bool("f", "Yes").unwrap());
        assert!(!parse_bool("f", "false").unwrap());
        assert!(!parse_bool("f", "0").unwrap());
        assert!(parse_bool("f", "maybe").is_err());
    }

    #[test]
    fn submit_request_defaults_match_service_defaults() {
        let body: SubmitRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(body.task, TaskKind::Transcribe);
        assert_eq!(body.language, "auto");
        assert_eq!(body.batch_size, 64);
        assert_eq!(body.timestamp, TimestampGranularity::Chunk);
        assert!(!body.diarise_audio);
        assert!(!body.is_async);
        assert!(body.webhook.is_none());
        assert!(body.managed_task_id.is_none());
    }

    #[test]
    fn terminal_body_shapes() {
        let failed = JobOutcome::Failed("boom".into());
        let body = terminal_body(&failed);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "boom");

        let cancelled = terminal_body(&JobOutcome::Cancelled);
        assert_eq!(cancelled["error"], "Task Cancelled");
    }
}
