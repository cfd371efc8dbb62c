use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod config;
mod engine;
mod http;
mod store;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("hearthd starting");

    let config = config::Config::from_env();
    let alerts = hearth_alert::AlertConfig::from_env();

    let store = store::MessageStore::open(&config.db_path)
        .with_context(|| format!("opening message store at {}", config.db_path.display()))?;

    let monitor = engine::spawn_monitor(&config, &alerts).context("starting monitor engine")?;

    let app = http::router(http::AppState { store });
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "REST surface listening");

    tracing::info!("hearthd ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("hearthd shutting down");
    monitor.shutdown();

    Ok(())
}
