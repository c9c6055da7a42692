//! Router assembly and server lifecycle.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use vox_inference::SpeechEngine;
use vox_jobs::{JobExecutor, JobRegistry};

use crate::auth;
use crate::config::ServerConfig;
use crate::routes;
use crate::shutdown::ShutdownCoordinator;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration.
    pub config: Arc<ServerConfig>,
    /// Tracked jobs.
    pub registry: Arc<JobRegistry>,
    /// Runs jobs against the speech engine.
    pub executor: Arc<JobExecutor>,
    /// Graceful shutdown signal.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Process start, for uptime reporting.
    pub start_time: Instant,
}

/// The HTTP server: owns the wired-up state and serves the router.
pub struct VoxServer {
    state: AppState,
}

impl VoxServer {
    /// Wire registry, executor and state around the given engine.
    #[must_use]
    pub fn new(config: ServerConfig, engine: Arc<dyn SpeechEngine>) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let executor = Arc::new(JobExecutor::new(
            engine,
            Arc::clone(&registry),
            config.hf_token.clone(),
            config.machine_id.clone(),
            config.max_concurrency,
        ));
        let state = AppState {
            config: Arc::new(config),
            registry,
            executor,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        };
        Self { state }
    }

    /// Clone of the wired state.
    #[must_use]
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Serve until ctrl-c or a shutdown request, then drain in-flight
    /// background jobs so their cleanup and webhooks still run.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let executor = Arc::clone(&self.state.executor);
        let shutdown = Arc::clone(&self.state.shutdown);
        let token = shutdown.token();
        let router = build_router(self.state);
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "listening");
        }
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("ctrl-c received, shutting down"),
                    () = token.cancelled() => info!("shutdown requested"),
                }
            })
            .await;

        shutdown.graceful_shutdown(executor.take_handles(), None).await;
        result
    }
}

/// Build the router: routes, body limit, admin-key gate, tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(routes::submit))
        .route("/tasks", get(routes::tasks))
        .route("/status/{task_id}", get(routes::status))
        .route("/cancel/{task_id}", delete(routes::cancel))
        .route("/health", get(routes::health_handler))
        .layer(DefaultBodyLimit::max(routes::MAX_BODY_SIZE))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin_key,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
