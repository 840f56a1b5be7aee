//! Issuer resolution
//!
//! Maps a token request (credential plus optional execution context), an
//! admin request, or a metadata request path to the governing issuer.

use crate::credential::Credential;
use crate::error::{OidcError, Result};
use crate::issuer::{ConfigRequest, Issuer, IssuerFactory};
use crate::metadata::MetadataDocument;
use jobtoken_core::ExecutionContext;
use std::sync::Arc;

/// Resolves issuers through an ordered list of factories
#[derive(Clone)]
pub struct IssuerResolver {
    root: Arc<dyn Issuer>,
    factories: Vec<Arc<dyn IssuerFactory>>,
}

impl IssuerResolver {
    /// `root` governs tokens issued outside any execution context;
    /// `factories` are consulted in order for everything else.
    pub fn new(root: Arc<dyn Issuer>, factories: Vec<Arc<dyn IssuerFactory>>) -> Self {
        Self { root, factories }
    }

    pub fn root(&self) -> &Arc<dyn Issuer> {
        &self.root
    }

    /// Find the issuer `credential` signs for.
    ///
    /// Without a context this is the root issuer. With one, the first issuer
    /// offered for the context that holds the credential wins; no match is
    /// a configuration defect.
    pub fn for_credential(
        &self,
        credential: &Credential,
        context: Option<&ExecutionContext>,
    ) -> Result<Arc<dyn Issuer>> {
        let Some(context) = context else {
            return Ok(self.root.clone());
        };

        self.factories
            .iter()
            .flat_map(|f| f.for_context(context))
            .find(|issuer| issuer.contains(credential.id()))
            .ok_or_else(|| OidcError::IssuerNotFound {
                credential: credential.id().to_string(),
                context: context.externalizable_id(),
            })
    }

    /// Issuer of the scope an admin request is editing
    pub fn for_config(&self, request: &ConfigRequest) -> Option<Arc<dyn Issuer>> {
        self.factories.iter().find_map(|f| f.for_config(request))
    }

    /// Find the issuer serving `document` at `path`.
    ///
    /// `path` is relative to the metadata root, e.g. `/job/team/jwks`. The
    /// first factory to claim the base URI decides the outcome: an issuer
    /// whose own URI differs is rejected, and a JWKS lookup is rejected when
    /// the issuer has no credentials using its default URL.
    pub fn for_path(&self, path: &str, document: MetadataDocument) -> Option<Arc<dyn Issuer>> {
        let uri = path.strip_suffix(document.suffix())?;
        tracing::debug!(uri, "Looking up issuer");

        let issuer = self.factories.iter().find_map(|f| f.for_uri(uri))?;

        if issuer.uri() != uri {
            tracing::warn!(
                expected = uri,
                actual = issuer.uri(),
                "{:?} was expected to have a different URI",
                issuer
            );
            return None;
        }

        if document == MetadataDocument::Jwks && issuer.default_credentials().is_empty() {
            tracing::debug!(
                uri,
                "Found issuer but it has no credentials with default issuer; not advertising it"
            );
            return None;
        }

        tracing::debug!(uri, url = issuer.url(), "Found issuer");
        Some(issuer)
    }
}
