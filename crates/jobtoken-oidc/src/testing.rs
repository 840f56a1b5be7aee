//! Shared fixtures for unit tests

use crate::credential::Credential;
use crate::issuer::{ConfigRequest, Issuer, IssuerFactory};
use jobtoken_core::{ExecutionContext, KeyAlgorithm};
use jobtoken_crypto::{KeyManager, MasterKeyCipher};
use std::sync::Arc;

const MASTER_KEY: [u8; 32] = [5u8; 32];

pub fn cipher() -> MasterKeyCipher {
    MasterKeyCipher::new(&MASTER_KEY)
}

pub fn key_manager() -> KeyManager {
    KeyManager::new(Arc::new(cipher()))
}

/// ES256 credential with an optional issuer override
pub fn credential(id: &str, issuer: Option<&str>) -> Arc<Credential> {
    Arc::new(
        Credential::generate(id, KeyAlgorithm::Es256, &key_manager())
            .unwrap()
            .with_issuer(issuer.map(str::to_string)),
    )
}

/// Factory over a list of scoped issuers, outermost last
pub struct ScopeFactory {
    issuers: Vec<Arc<dyn Issuer>>,
    answers: Vec<(String, Arc<dyn Issuer>)>,
}

impl ScopeFactory {
    pub fn new(issuers: Vec<Arc<dyn Issuer>>) -> Self {
        Self {
            issuers,
            answers: Vec::new(),
        }
    }

    /// Answer `for_uri(uri)` with `issuer` regardless of its own URI
    pub fn answering(mut self, uri: &str, issuer: Arc<dyn Issuer>) -> Self {
        self.answers.push((uri.to_string(), issuer));
        self
    }
}

impl IssuerFactory for ScopeFactory {
    fn for_context(&self, context: &ExecutionContext) -> Vec<Arc<dyn Issuer>> {
        self.issuers
            .iter()
            .filter(|i| {
                let uri = i.uri();
                uri.is_empty()
                    || context.scope == uri
                    || context.scope.starts_with(&format!("{}/", uri))
            })
            .cloned()
            .collect()
    }

    fn for_config(&self, request: &ConfigRequest) -> Option<Arc<dyn Issuer>> {
        self.issuers.iter().find(|i| i.uri() == request.scope).cloned()
    }

    fn for_uri(&self, uri: &str) -> Option<Arc<dyn Issuer>> {
        self.answers
            .iter()
            .find(|(answered, _)| answered == uri)
            .map(|(_, issuer)| issuer.clone())
            .or_else(|| self.issuers.iter().find(|i| i.uri() == uri).cloned())
    }
}
