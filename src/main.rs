//! Main entry point for the tubefetch server

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tubefetch::cli::{Args, VerbosityLevel};
use tubefetch::platform::YtDlpExtractor;
use tubefetch::web::{self, AppState};
use tubefetch::{DownloadPipeline, SourceResolver};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    init_logging(args.verbosity_level())?;
    info!("Starting tubefetch with args: {:?}", args);

    let extractor = Arc::new(
        YtDlpExtractor::with_program(&args.ytdlp).with_timeout(args.timeout_duration()),
    );
    let resolver = SourceResolver::new(extractor.clone()).with_max_results(args.max_results);
    info!(
        "Using {} for extraction, searches return up to {} results",
        extractor.program().display(),
        resolver.max_results()
    );
    let pipeline = DownloadPipeline::new(extractor, args.pipeline_options());

    let app = web::router(AppState::new(resolver, pipeline));

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running HTTP server")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", err);
    }
}

/// Initialize logging system
fn init_logging(verbosity: VerbosityLevel) -> Result<()> {
    // RUST_LOG wins over the command line verbosity
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init()
        .context("initializing tracing subscriber")?;

    Ok(())
}
