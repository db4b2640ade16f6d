use admin_data_access::config::Config;
use admin_data_access::handlers;
use admin_data_access::services::mock_backend::MockTier;
use admin_data_access::AppState;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,admin_data_access=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    // The reference backend answers immediately; latency only applies to the
    // client-side mock tier
    let state = AppState {
        tier: Arc::new(MockTier::new(Duration::ZERO)),
        require_auth: config.require_auth,
    };
    let app = handlers::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        require_auth = config.require_auth,
        "Reference backend listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}
