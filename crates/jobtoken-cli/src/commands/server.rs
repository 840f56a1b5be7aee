//! Server command - starts the jobtoken HTTP server

use anyhow::{Context, Result};
use console::style;
use jobtoken_oidc::metadata::{JWKS, WELL_KNOWN_OPENID_CONFIGURATION};
use jobtoken_server::{config::Settings, create_router, state::AppState};

pub async fn run(mut settings: Settings, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        settings.bind = bind;
    }

    let state = AppState::load(&settings).context("Failed to load credentials")?;
    let root = settings.oidc_config().issuer_url("");

    println!();
    println!("{}", style("Endpoints:").bold());
    println!("  Discovery: {}{}", root, WELL_KNOWN_OPENID_CONFIGURATION);
    println!("  JWKS:      {}{}", root, JWKS);
    if state.admin_key.is_none() {
        println!(
            "{}",
            style("  Admin routes are disabled; set JOBTOKEN_ADMIN_KEY to enable them.").yellow()
        );
    }
    println!();

    tracing::info!("Starting jobtoken server on {}", settings.bind);

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    axum::serve(listener, create_router(state))
        .await
        .context("Server error")?;
    Ok(())
}
