//! Admin-key authentication middleware.
//!
//! When `admin_key` is configured, every request must present it in the
//! `x-admin-api-key` header; otherwise the request is rejected with 401
//! before reaching any handler. With no key configured the server is
//! open.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::errors::ApiError;
use crate::server::AppState;

/// Header carrying the admin API key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-api-key";

/// Reject requests that do not present the configured admin key.
pub async fn require_admin_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = &state.config.admin_key {
        let provided = request
            .headers()
            .get(ADMIN_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        if provided != Some(expected.as_str()) {
            debug!(path = %request.uri().path(), "rejecting request without valid admin key");
            return ApiError::Unauthorized.into_response();
        }
    }
    next.run(request).await
}
