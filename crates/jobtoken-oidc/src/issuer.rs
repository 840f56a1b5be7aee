//! Issuers and the factories that locate them
//!
//! An issuer is a base URL plus the credentials reachable under it. The
//! host owns issuers; this crate only consumes them through [`Issuer`] and
//! finds them through [`IssuerFactory`] implementations.

use crate::config::OidcConfig;
use crate::credential::Credential;
use jobtoken_core::ExecutionContext;
use std::fmt;
use std::sync::Arc;

/// A named collection of credentials served at one base URL
pub trait Issuer: Send + Sync + fmt::Debug {
    /// Base URI relative to the metadata root: `""` or e.g. `"/job/team"`
    fn uri(&self) -> &str;

    /// Absolute issuer URL, used as `iss` and in the discovery document
    fn url(&self) -> &str;

    /// Credentials in this issuer's scope, in display order
    fn credentials(&self) -> Vec<Arc<Credential>>;

    /// Whether the credential with `id` belongs to this issuer
    fn contains(&self, id: &str) -> bool {
        self.credentials().iter().any(|c| c.id() == id)
    }

    /// Credentials that use this issuer's own URL rather than an override
    fn default_credentials(&self) -> Vec<Arc<Credential>> {
        self.credentials()
            .into_iter()
            .filter(|c| c.issuer().is_none())
            .collect()
    }
}

/// The admin screen a configuration request originates from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRequest {
    /// URI of the scope being configured, `""` for the root
    pub scope: String,
}

impl ConfigRequest {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }
}

/// Locates issuers for running jobs, admin screens and metadata requests
pub trait IssuerFactory: Send + Sync {
    /// Issuers visible to a running job, innermost first
    fn for_context(&self, context: &ExecutionContext) -> Vec<Arc<dyn Issuer>>;

    /// Issuer of the scope an admin request is editing
    fn for_config(&self, request: &ConfigRequest) -> Option<Arc<dyn Issuer>>;

    /// Issuer whose base URI is `uri`
    fn for_uri(&self, uri: &str) -> Option<Arc<dyn Issuer>>;
}

/// Issuer over a fixed credential list
#[derive(Debug, Clone)]
pub struct StaticIssuer {
    uri: String,
    url: String,
    credentials: Vec<Arc<Credential>>,
}

impl StaticIssuer {
    pub fn new(config: &OidcConfig, uri: impl Into<String>, credentials: Vec<Arc<Credential>>) -> Self {
        let uri = uri.into();
        Self {
            url: config.issuer_url(&uri),
            uri,
            credentials,
        }
    }
}

impl Issuer for StaticIssuer {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn credentials(&self) -> Vec<Arc<Credential>> {
        self.credentials.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::credential;

    #[test]
    fn test_static_issuer() {
        let config = OidcConfig::new("https://ci.example.org");
        let issuer = StaticIssuer::new(
            &config,
            "/job/team",
            vec![
                credential("c1", None),
                credential("c2", Some("https://elsewhere.example")),
            ],
        );

        assert_eq!(issuer.uri(), "/job/team");
        assert_eq!(issuer.url(), "https://ci.example.org/oidc/job/team");
        assert!(issuer.contains("c2"));
        assert!(!issuer.contains("c3"));

        let defaults = issuer.default_credentials();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id(), "c1");
    }
}
