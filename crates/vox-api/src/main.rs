//! # vox-api
//!
//! Vox server binary — loads configuration, wires the inference sidecar
//! client and starts the HTTP server.

#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vox_inference::SidecarEngine;
use vox_server::{ServerConfig, VoxServer};

/// Vox transcription server.
///
/// Configuration comes from `VOX_*` environment variables; flags given
/// here override them.
#[derive(Parser, Debug)]
#[command(name = "vox-api", about = "Speech-to-text inference server")]
struct Cli {
    /// Host to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind.
    #[arg(long)]
    port: Option<u16>,

    /// Base URL of the inference sidecar.
    #[arg(long)]
    engine_url: Option<String>,

    /// Maximum concurrent model invocations.
    #[arg(long)]
    max_concurrency: Option<usize>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging();

    let mut config = ServerConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(engine_url) = args.engine_url {
        config.engine_url = engine_url;
    }
    if let Some(max_concurrency) = args.max_concurrency {
        config.max_concurrency = max_concurrency.clamp(1, 64);
    }

    let addr = format!("{}:{}", config.host, config.port);
    info!(
        %addr,
        engine_url = %config.engine_url,
        auth_enabled = config.admin_key.is_some(),
        diarization_enabled = config.hf_token.is_some(),
        max_concurrency = config.max_concurrency,
        "starting vox server"
    );

    let engine = Arc::new(SidecarEngine::new(config.engine_url.clone()));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    VoxServer::new(config, engine)
        .serve(listener)
        .await
        .context("Server error")
}
