//! garden-exporter — the garden metrics daemon.
//!
//! # Usage
//!
//! ```text
//! garden-exporter serve --config /etc/garden/exporter.toml
//! garden-exporter render --snapshot snapshot.json
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use garden_exporter::refresh::refresh_once;
use garden_exporter::{Exporter, ExporterConfig};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,garden_exporter=debug,garden_metrics=debug";

#[derive(Parser)]
#[command(name = "garden-exporter", about = "Garden metrics exporter", version)]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Serve /metrics, /healthz and /readyz.
    Serve {
        /// Path to the TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Listen address, overrides `server.listen`.
        #[arg(long)]
        listen: Option<SocketAddr>,

        /// Snapshot document, overrides `snapshot.path`.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Load a snapshot once and print the exposition to stdout.
    Render {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        snapshot: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Serve {
            config,
            listen,
            snapshot,
        } => {
            let mut config = load_config(config)?;
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            if let Some(snapshot) = snapshot {
                config.snapshot.path = snapshot;
            }
            run_serve(config).await
        }
        Command::Render { config, snapshot } => {
            let mut config = load_config(config)?;
            config.snapshot.path = snapshot;
            run_render(config)
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<ExporterConfig> {
    match path {
        Some(path) => {
            let config = ExporterConfig::from_file(&path)?;
            info!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => Ok(ExporterConfig::default()),
    }
}

async fn run_serve(config: ExporterConfig) -> anyhow::Result<()> {
    info!("garden exporter starting");

    let exporter = Exporter::build(&config, prometheus::default_registry().clone())?;

    // ── Initial load ───────────────────────────────────────────

    match refresh_once(&config.snapshot.path, &exporter.caches) {
        Ok(report) => info!(loaded = report.loaded, skipped = report.skipped, "snapshot loaded"),
        Err(e) => warn!(error = %e, "initial snapshot load failed, not ready until a refresh succeeds"),
    }

    // ── Background tasks ───────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handles = exporter.spawn_background(&config, shutdown_rx)?;

    // ── HTTP server ────────────────────────────────────────────

    let addr = config.server.listen;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "http server listening");

    axum::serve(listener, exporter.router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    for handle in handles {
        let _ = handle.await;
    }

    info!("garden exporter stopped");
    Ok(())
}

fn run_render(config: ExporterConfig) -> anyhow::Result<()> {
    let exporter = Exporter::build(&config, prometheus::Registry::new())?;
    refresh_once(&config.snapshot.path, &exporter.caches)?;
    let text = garden_metrics::render_prometheus(&exporter.registry)?;
    print!("{text}");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
