//! HTTP service for running reprogrammable cellular automata.

mod api;
mod session;
mod telemetry;

use anyhow::Result;
use rca_core::ServerConfig;
use std::sync::Arc;
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = ServerConfig::from_env();

    telemetry::init_telemetry(config.log_format)?;

    info!("Starting RCA server on {}:{}", config.bind_address, config.port);

    let sessions = Arc::new(session::SessionManager::new(config.max_sessions));

    // Drop idle sessions in the background
    let sweeper = sessions.clone();
    let ttl = Duration::from_secs(config.session_ttl_secs);
    tokio::spawn(async move {
        let mut ticker = interval(ttl.min(Duration::from_secs(60)).max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            sweeper.expire_idle(ttl);
        }
    });

    let addr = format!("{}:{}", config.bind_address, config.port);
    let app = api::router(api::AppState {
        sessions,
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
