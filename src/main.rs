//! SkillHub participation service
//!
//! Main application entry point

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use SkillHub::{config::Settings, handlers, utils::logging, AppState, ServiceFactory};

const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;

    if std::env::args().any(|arg| arg == "--print-config") {
        println!("{}", settings.to_redacted_toml()?);
        return Ok(());
    }

    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", SkillHub::info());

    let services = ServiceFactory::from_settings(&settings).await?;
    let state = AppState::new(&settings, services.clone())?;

    if let Some(limiter) = state.rate_limiter.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                limiter.cleanup();
            }
        });
    }

    let listener = TcpListener::bind(&settings.server.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind_address))?;
    info!(address = %settings.server.bind_address, "SkillHub is listening");

    let served = axum::serve(listener, handlers::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    services.shutdown().await;

    if let Err(e) = served {
        error!(error = %e, "Server terminated with an error");
        return Err(e.into());
    }

    info!("SkillHub has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
