//! qjob Dashboard binary entry point.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qjob_core::QjobConfig;
use qjob_dashboard::{AppState, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qjob_dashboard=info,qjob_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = QjobConfig::load(None).context("Failed to load configuration")?;
    let bind_addr = config.bind_address()?;

    let state = Arc::new(AppState::from_config(config));
    let caps = state.services.capabilities();
    if !caps.quantum.available {
        tracing::warn!("built without an IBM Quantum client; runs will report an error");
    }
    if !caps.assistant.available {
        tracing::warn!("built without a chat client; the assistant is disabled");
    }

    let app = create_router(state);

    tracing::info!("Starting qjob Dashboard at http://{}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
