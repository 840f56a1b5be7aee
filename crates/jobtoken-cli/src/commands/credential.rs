//! Credential management commands

use anyhow::{bail, Context, Result};
use console::style;
use jobtoken_core::KeyAlgorithm;
use jobtoken_oidc::{admin, Credential, FormValidation};
use jobtoken_server::config::Settings;
use jobtoken_server::store::StoreFile;

use super::{key_manager, open_store};

pub struct NewCredential {
    pub id: String,
    pub algorithm: KeyAlgorithm,
    pub scope: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub description: Option<String>,
}

/// Generate a key pair and save a credential in the store
pub fn create(settings: &Settings, new: NewCredential) -> Result<()> {
    if let Some(issuer) = new.issuer.as_deref().filter(|i| !i.is_empty()) {
        if let Some(FormValidation::Error(message)) = admin::check_issuer_url(issuer) {
            bail!("Invalid issuer {}: {}", issuer, message);
        }
    }

    let keys = key_manager(settings)?;
    let mut file = StoreFile::read(&settings.credentials_file)?;

    tracing::debug!(algorithm = %new.algorithm, "Generating key pair");
    let credential = Credential::generate(new.id.as_str(), new.algorithm, &keys)
        .context("Failed to generate key pair")?
        .with_issuer(new.issuer)
        .with_audience(new.audience)
        .with_description(new.description);

    file.save_credential(&new.scope, credential.to_record());
    file.write(&settings.credentials_file)?;

    println!();
    println!("  ID:        {}", style(credential.id()).cyan());
    println!("  Algorithm: {}", style(credential.algorithm()).cyan());
    println!("  Scope:     {}", style(display_scope(&new.scope)).yellow());
    if let Some(issuer) = credential.issuer() {
        println!("  Issuer:    {}", style(issuer).yellow());
    }
    if let Some(audience) = credential.audience() {
        println!("  Audience:  {}", audience);
    }
    println!();
    println!("{}", style("✓ Credential saved").green().bold());

    Ok(())
}

/// Print every scope and its credentials
pub fn list(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let file = StoreFile::read(&settings.credentials_file)?;

    for scope in &file.scopes {
        println!(
            "\n{} {}",
            style(display_scope(&scope.uri)).bold(),
            style(settings.oidc_config().issuer_url(&scope.uri)).dim()
        );
        for record in &scope.credentials {
            let Some(credential) = store.credential(&scope.uri, &record.id) else {
                continue;
            };
            let served_from = credential
                .issuer()
                .map(|i| format!(" (issuer {})", i))
                .unwrap_or_default();
            println!(
                "  {} {}{}",
                style(credential.id()).cyan(),
                credential.algorithm(),
                served_from
            );
        }
    }
    Ok(())
}

pub(crate) fn display_scope(uri: &str) -> &str {
    if uri.is_empty() {
        "(root)"
    } else {
        uri
    }
}
