//! jobtoken Server
//!
//! Serves OIDC discovery documents and JWKS for the issuers in the
//! credential store.

use anyhow::Context;
use jobtoken_server::{config::Settings, create_router, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "jobtoken_server=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("Failed to load configuration")?;
    let state = AppState::load(&settings).context("Failed to load credentials")?;
    if state.admin_key.is_none() {
        tracing::warn!("JOBTOKEN_ADMIN_KEY is not set; admin routes are disabled");
    }

    let app = create_router(state);

    tracing::info!(
        root_url = %settings.root_url,
        "Starting jobtoken server on {}",
        settings.bind
    );

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
