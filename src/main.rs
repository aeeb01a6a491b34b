//! Bibliotheca Server - library lending and reservations
//!
//! REST API server over an in-memory lending ledger.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use bibliotheca_server::{
    api,
    clock::SystemClock,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::{notifier_from_config, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Bibliotheca Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        max_active_borrows = config.lending.max_active_borrows,
        max_queue_memberships = config.lending.max_queue_memberships,
        queue_when_available = config.lending.queue_when_available,
        "Lending rules loaded"
    );

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create repository and services
    let repository = Repository::new();
    let notifier = notifier_from_config(&config.email);
    let services = Services::new(
        repository,
        config.lending.clone(),
        Arc::new(SystemClock),
        notifier,
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the global subscriber: stdout by default, a daily rolling file when
/// a log directory is configured
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("bibliotheca_server={},tower_http=debug", logging.level).into()
    });

    let (writer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "bibliotheca.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }

    guard
}
