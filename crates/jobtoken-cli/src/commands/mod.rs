//! CLI command implementations

pub mod credential;
pub mod metadata;
pub mod server;
pub mod token;

use anyhow::{Context, Result};
use jobtoken_crypto::{KeyManager, MasterKeyCipher};
use jobtoken_server::config::Settings;
use jobtoken_server::store::CredentialStore;
use std::sync::Arc;

/// Load settings from `config` and the environment
pub fn settings(config: &str) -> Result<Settings> {
    Settings::load_from(config).context("Failed to load configuration")
}

/// Key manager over the master key named in `settings`
pub fn key_manager(settings: &Settings) -> Result<KeyManager> {
    let cipher = MasterKeyCipher::load_or_generate(&settings.master_key_file).with_context(|| {
        format!(
            "Failed to load master key {}",
            settings.master_key_file.display()
        )
    })?;
    Ok(KeyManager::new(Arc::new(cipher)))
}

/// Open the credential store named in `settings`
pub fn open_store(settings: &Settings) -> Result<CredentialStore> {
    let keys = key_manager(settings)?;
    CredentialStore::open(&settings.credentials_file, &settings.oidc_config(), &keys)
        .context("Failed to open credential store")
}
