//! Provider-wide URL configuration

use serde::{Deserialize, Serialize};

/// Path segment under the root URL where issuer metadata is served
pub const URL_NAME: &str = "oidc";

/// Provider-wide settings shared by every issuer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcConfig {
    /// Root URL of the host (e.g., "https://ci.example.org"), no trailing slash
    pub root_url: String,
}

impl OidcConfig {
    pub fn new(root_url: impl Into<String>) -> Self {
        let root_url: String = root_url.into();
        Self {
            root_url: root_url.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL of the issuer served at `uri` (`""` for the root issuer)
    pub fn issuer_url(&self, uri: &str) -> String {
        format!("{}/{}{}", self.root_url, URL_NAME, uri)
    }

    /// Subject of tokens issued outside any execution context
    pub fn root_subject(&self) -> String {
        format!("{}/", self.root_url)
    }
}
