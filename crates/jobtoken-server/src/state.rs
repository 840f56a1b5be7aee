//! Application state

use crate::config::Settings;
use crate::store::{CredentialStore, Result};
use jobtoken_crypto::{KeyManager, MasterKeyCipher};
use jobtoken_oidc::IssuerResolver;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolves issuers for metadata and admin requests
    pub resolver: Arc<IssuerResolver>,

    /// Required `X-Admin-Key` value, if admin routes are protected
    pub admin_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(resolver: IssuerResolver, admin_key: Option<String>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            admin_key: admin_key.filter(|k| !k.is_empty()).map(Arc::from),
        }
    }

    /// Load the master key and credential store named by `settings`
    pub fn load(settings: &Settings) -> Result<Self> {
        let cipher = MasterKeyCipher::load_or_generate(&settings.master_key_file)?;
        let keys = KeyManager::new(Arc::new(cipher));
        let store = CredentialStore::open(&settings.credentials_file, &settings.oidc_config(), &keys)?;
        Ok(Self::new(store.resolver(), settings.admin_key.clone()))
    }
}
