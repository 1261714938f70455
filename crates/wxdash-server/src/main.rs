use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use wxdash_config::AppConfig;
use wxdash_server::Settings;
use wxdash_upstream::OpenWeatherClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    wxdash_obs::init("wxdash");

    // Config
    let cfg = AppConfig::load().context("failed to load configuration")?;
    let settings = Settings::from_config(&cfg)?;
    info!(
        timezone = %settings.timezone.name(),
        units = %settings.default_unit,
        upstream = %cfg.upstream_base_url(),
        "configuration loaded"
    );

    let client = OpenWeatherClient::new(
        cfg.upstream_base_url(),
        Duration::from_secs(cfg.upstream_timeout_secs()),
    )?;

    // Build app and state
    let (app, state) = wxdash_server::build_app(Arc::new(client), settings)?;

    // Start HTTP server
    let addr = cfg.http_bind()?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;

    // Mark ready just before serving
    wxdash_server::set_ready(&state, true);

    info!(%addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
