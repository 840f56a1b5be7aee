//! Metadata and admin commands

use anyhow::{anyhow, bail, Result};
use console::style;
use jobtoken_oidc::{admin, ConfigRequest, DiscoveryDocument, FormValidation, JsonWebKeySet};
use jobtoken_server::config::Settings;

use super::{credential::display_scope, open_store};

/// Print the discovery document of a scope, or of an external issuer
pub fn discovery(settings: &Settings, scope: &str, issuer: Option<&str>) -> Result<()> {
    let document = match issuer {
        Some(issuer) => admin::well_known_openid_configuration(issuer),
        None => DiscoveryDocument::for_issuer(&settings.oidc_config().issuer_url(scope)),
    };
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Print the JWKS of a scope, or of one externally served credential
pub fn jwks(settings: &Settings, scope: &str, external: Option<(String, String)>) -> Result<()> {
    let store = open_store(settings)?;
    let resolver = store.resolver();
    let request = ConfigRequest::new(scope);

    let jwks = match external {
        Some((id, issuer)) => admin::credential_jwks(&resolver, &request, &id, &issuer)?
            .ok_or_else(|| anyhow!("No credential {} served from {}", id, issuer))?,
        None => {
            let issuer = resolver
                .for_config(&request)
                .ok_or_else(|| anyhow!("No scope {}", display_scope(scope)))?;
            JsonWebKeySet::for_issuer(issuer.as_ref())?
        }
    };
    println!("{}", serde_json::to_string_pretty(&jwks)?);
    Ok(())
}

pub fn check_issuer(settings: &Settings, scope: &str, id: &str, issuer: Option<&str>) -> Result<()> {
    let store = open_store(settings)?;
    let result = admin::check_issuer(&store.resolver(), &ConfigRequest::new(scope), id, issuer);
    match &result {
        FormValidation::Ok(message) => println!("{} {}", style("✓").green().bold(), message),
        FormValidation::Warning(message) => println!("{} {}", style("!").yellow().bold(), message),
        FormValidation::Error(message) => bail!("{}", message),
    }
    Ok(())
}

pub fn algorithms() {
    for name in admin::algorithm_choices() {
        println!("{}", name);
    }
}
