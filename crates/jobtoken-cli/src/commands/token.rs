//! Token issuance command

use anyhow::{anyhow, Result};
use jobtoken_core::ExecutionContext;
use jobtoken_oidc::TokenIssuer;
use jobtoken_server::config::Settings;
use std::sync::Arc;

use super::{credential::display_scope, open_store};

/// Print an ID token for credential `id`, optionally for job `(subject, build)`
pub fn issue(
    settings: &Settings,
    scope: &str,
    id: &str,
    job: Option<(String, u64)>,
    claims_only: bool,
) -> Result<()> {
    let store = open_store(settings)?;
    let credential = store
        .credential(scope, id)
        .ok_or_else(|| anyhow!("No credential {} in scope {}", id, display_scope(scope)))?;

    let context = job.map(|(subject, build)| ExecutionContext::new(subject, build).in_scope(scope));
    let issuer = TokenIssuer::new(Arc::new(store.resolver()), settings.oidc_config());
    let token = issuer.issue(&credential, context.as_ref())?;

    if claims_only {
        println!("{}", serde_json::to_string_pretty(&token.claims)?);
    } else {
        println!("{}", token.as_str());
    }
    Ok(())
}
