//! Oracle Trader — Entry Point
//!
//! Initializes configuration, logging, persistence, the inference client,
//! and the ledger actor, then serves the HTTP API until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Load oracle API key from env (ORACLE_API_KEY / OPENAI_API_KEY)
//! 4. Open the file-backed ledger repository
//! 5. Initialize the ledger actor (awaits the persisted-state load —
//!    the init barrier: no request is served against stale defaults)
//! 6. Serve the axum API (+ /live, /ready probes)
//! 7. Wait for SIGINT → readiness flips to 503 → graceful shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::http::{router, AppState};
use adapters::oracle::{InferenceClient, InferenceClientConfig};
use adapters::persistence::FileLedgerRepository;
use usecases::actor::LedgerActor;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config =
        config::loader::load_config("config.toml").context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.bot.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        model = %config.oracle.model,
        "Starting Oracle Trader"
    );

    // ── 3. Inference client (API key from env) ──────────────
    let oracle_config = InferenceClientConfig {
        base_url: config.oracle.base_url.clone(),
        model: config.oracle.model.clone(),
        temperature: config.oracle.temperature,
        timeout: Duration::from_millis(config.oracle.timeout_ms),
        max_retries: config.oracle.max_retries,
        retry_base_delay: Duration::from_millis(250),
    };
    let oracle = Arc::new(
        InferenceClient::from_env(oracle_config)
            .context("Failed to create inference client")?,
    );

    // ── 4. File-backed ledger repository ────────────────────
    let repo = Arc::new(
        FileLedgerRepository::from_data_dir(&config.persistence.data_dir)
            .await
            .context("Failed to open ledger repository")?,
    );

    // ── 5. Ledger actor (init barrier: awaits persisted load) ─
    let actor = Arc::new(
        LedgerActor::init(Arc::clone(&repo), Arc::clone(&oracle))
            .await
            .context("Failed to initialize ledger actor")?,
    );

    // ── 6. Serve the HTTP API ───────────────────────────────
    let (health_tx, health_rx) = watch::channel(true);
    let app = router(AppState {
        actor,
        ready: health_rx,
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    info!(bind = %config.server.bind_address, "API server listening");

    // ── 7. Run until SIGINT, then shut down gracefully ──────
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = signal::ctrl_c().await;
            info!("SIGINT received, initiating graceful shutdown");
            // Readiness probe flips to 503 while in-flight requests drain.
            let _ = health_tx.send(false);
        })
        .await
        .context("API server failed")?;

    info!("Shutdown complete");
    Ok(())
}
