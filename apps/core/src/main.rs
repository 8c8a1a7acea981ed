// Wellness Chat Backend Entry Point
// Classifies a message, answers from a topic guide or a generator, serves it over HTTP

mod backends;
mod brain;
mod config;
mod error;
mod logging;
mod models;
mod preflight;
mod responder;
mod server;
mod session;

#[cfg(test)]
mod tests;

use anyhow::Context;
use config::AppConfig;
use server::{app_router, AppState};
use session::SessionStore;
use tracing::info;

const SERVICE_NAME: &str = "wellness-core";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    logging::init_tracing(SERVICE_NAME, config.log_format);

    info!("Starting {} v{}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    info!(
        "Classifier: {:?}, history mode: {:?}, external timeout: {:?}",
        config.classifier,
        config.history_mode,
        config.external_timeout()
    );

    let (responder, report) = preflight::build_responder(&config)
        .await
        .context("Failed to build responder")?;
    if !report.all_passed {
        info!("Running with capabilities: {:?}", responder.capabilities());
    }

    let sessions = SessionStore::new(config.max_sessions, config.history_mode);
    let app = app_router(AppState::new(responder, sessions));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
