//! Metadata documents served under each issuer's base URI

use crate::discovery::DiscoveryDocument;
use crate::error::Result;
use crate::jwks::JsonWebKeySet;
use crate::resolver::IssuerResolver;
use serde::Serialize;

pub const WELL_KNOWN_OPENID_CONFIGURATION: &str = "/.well-known/openid-configuration";
pub const JWKS: &str = "/jwks";

/// Which document a metadata request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataDocument {
    OpenidConfiguration,
    Jwks,
}

impl MetadataDocument {
    /// Path suffix identifying the document
    pub fn suffix(self) -> &'static str {
        match self {
            MetadataDocument::OpenidConfiguration => WELL_KNOWN_OPENID_CONFIGURATION,
            MetadataDocument::Jwks => JWKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataResponse {
    Discovery(DiscoveryDocument),
    Jwks(JsonWebKeySet),
}

/// Serve the metadata document at `path`, relative to the metadata root.
///
/// `Ok(None)` means no issuer is published there.
pub fn resolve(resolver: &IssuerResolver, path: &str) -> Result<Option<MetadataResponse>> {
    if let Some(issuer) = resolver.for_path(path, MetadataDocument::OpenidConfiguration) {
        return Ok(Some(MetadataResponse::Discovery(DiscoveryDocument::for_issuer(
            issuer.url(),
        ))));
    }
    if let Some(issuer) = resolver.for_path(path, MetadataDocument::Jwks) {
        return Ok(Some(MetadataResponse::Jwks(JsonWebKeySet::for_issuer(
            issuer.as_ref(),
        )?)));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OidcConfig;
    use crate::issuer::{Issuer, StaticIssuer};
    use crate::testing::{credential, ScopeFactory};
    use std::sync::Arc;

    fn resolver() -> IssuerResolver {
        let config = OidcConfig::new("https://ci.example.org");
        let root: Arc<dyn Issuer> =
            Arc::new(StaticIssuer::new(&config, "", vec![credential("c1", None)]));
        let team: Arc<dyn Issuer> = Arc::new(StaticIssuer::new(
            &config,
            "/job/team",
            vec![credential("c2", None), credential("c3", Some("https://elsewhere"))],
        ));
        let factory = ScopeFactory::new(vec![team, root.clone()]);
        IssuerResolver::new(root, vec![Arc::new(factory)])
    }

    #[test]
    fn test_resolve_discovery() {
        let response = resolve(&resolver(), "/job/team/.well-known/openid-configuration")
            .unwrap()
            .unwrap();
        match response {
            MetadataResponse::Discovery(doc) => {
                assert_eq!(doc.issuer, "https://ci.example.org/oidc/job/team");
                assert_eq!(doc.jwks_uri, "https://ci.example.org/oidc/job/team/jwks");
            }
            other => panic!("expected discovery document, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_jwks() {
        let response = resolve(&resolver(), "/job/team/jwks").unwrap().unwrap();
        match response {
            MetadataResponse::Jwks(jwks) => {
                assert_eq!(jwks.keys.len(), 1);
                assert_eq!(jwks.keys[0].kid(), "c2");
            }
            other => panic!("expected JWKS, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_unknown() {
        let resolver = resolver();
        assert!(resolve(&resolver, "/job/other/jwks").unwrap().is_none());
        assert!(resolve(&resolver, "/job/team").unwrap().is_none());
        assert!(resolve(&resolver, "/job/team/jwks/extra").unwrap().is_none());
    }
}
