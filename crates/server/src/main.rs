//! `es3-server`: HTTP boundary around the es3 save codec.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing, optionally OTLP).
//! 3. Build the [`Codec`] for the configured backend and passphrase.
//! 4. Build the Axum router and serve until ctrl-c.

mod config;
mod server;
mod telemetry;

use anyhow::{Context, Result};
use es3_codec::Codec;
use tracing::info;

use config::Config;
use server::{middleware::Limits, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        backend = %cfg.codec_backend,
        "es3-server starting"
    );

    // -----------------------------------------------------------------------
    // 3. Codec
    // -----------------------------------------------------------------------
    let codec = Codec::with_kind(cfg.passphrase()?, cfg.backend()?);

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(codec, cfg.compress_on_encrypt);
    let limits = Limits::new(cfg.request_timeout_secs, cfg.max_body_bytes);
    let router = server::router::build(state, limits);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if cfg.otel_exporter_otlp_endpoint.is_some() {
        opentelemetry::global::shutdown_tracer_provider();
    }
    info!("es3-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
    info!("shutdown signal received");
}
