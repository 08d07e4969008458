use anyhow::{Context, Result};
use clap::Parser;
use pdf_tools_api::{app, AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pdf_tools_api=debug,pdf_tools=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    let state = AppState::from_config(&config);
    info!(?state, "Configuration loaded");

    let app = app(state).layer(config.cors.layer()?);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    info!("PDF Tools API listening on http://{}", config.bind);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
