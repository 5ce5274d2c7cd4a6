use std::sync::Arc;

use anyhow::{Context, Result};
use carstore::{AppState, CarStore, build_router, config::AppConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load().context("failed to load application configuration")?;

    let store = CarStore::open(&config.database_path)
        .await
        .with_context(|| {
            format!(
                "failed to open car store at {}",
                config.database_path.display()
            )
        })?;
    info!(
        path = %config.database_path.display(),
        records = store.len().await,
        "car store ready"
    );

    let app = build_router(AppState::new(Arc::new(store)));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "car store server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("car store server stopped");
    Ok(())
}

const DEFAULT_LOG_FILTER: &str = "carstore=debug,tower_http=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[derive(Debug, Clone, Copy)]
enum StopSignal {
    Interrupt,
    Terminate,
}

async fn shutdown_signal() {
    let signal = tokio::select! {
        stop = interrupt() => stop,
        stop = terminate() => stop,
    };
    info!(?signal, "stop requested, draining connections");
}

async fn interrupt() -> StopSignal {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
    StopSignal::Interrupt
}

#[cfg(unix)]
async fn terminate() -> StopSignal {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(err) => {
            warn!(error = %err, "SIGTERM handler unavailable");
            std::future::pending::<()>().await;
        }
    }
    StopSignal::Terminate
}

#[cfg(not(unix))]
async fn terminate() -> StopSignal {
    std::future::pending::<StopSignal>().await
}
