//! Helpers behind the credential configuration screen

use crate::discovery::DiscoveryDocument;
use crate::error::Result;
use crate::issuer::ConfigRequest;
use crate::jwks::JsonWebKeySet;
use crate::metadata::{JWKS, WELL_KNOWN_OPENID_CONFIGURATION};
use crate::resolver::IssuerResolver;
use jobtoken_core::KeyAlgorithm;
use serde::{Deserialize, Serialize};
use url::Url;

/// Outcome of validating a form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum FormValidation {
    Ok(String),
    Warning(String),
    Error(String),
}

impl FormValidation {
    pub fn ok(message: impl Into<String>) -> Self {
        FormValidation::Ok(message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        FormValidation::Warning(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        FormValidation::Error(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            FormValidation::Ok(m) | FormValidation::Warning(m) | FormValidation::Error(m) => m,
        }
    }
}

/// Validate an issuer override typed into the form.
///
/// Returns `None` when the URL is acceptable.
pub fn check_issuer_url(issuer: &str) -> Option<FormValidation> {
    let url = match Url::parse(issuer) {
        Ok(url) if is_uri_text(issuer) => url,
        _ => return Some(FormValidation::error("Not a well-formed URI")),
    };
    // Url lowercases the scheme; the form takes it exactly as typed.
    if !issuer.starts_with("https:") {
        return Some(FormValidation::error("Issuer URIs should use https scheme"));
    }
    if url.query().is_some() {
        return Some(FormValidation::error("Issuer URIs must not have a query component"));
    }
    if url.fragment().is_some() {
        return Some(FormValidation::error("Issuer URIs must not have a fragment component"));
    }
    // Url normalizes an empty path to "/", so look at the input instead.
    if issuer.ends_with('/') {
        return Some(FormValidation::error(
            "Issuer URIs should not end with a slash (/) in this context",
        ));
    }
    None
}

/// Whether `text` only holds characters allowed unescaped in a URI, with
/// every `%` starting a two-digit escape. Url would silently encode the rest.
fn is_uri_text(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| match b {
        b'%' => bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)),
        b'"' | b'<' | b'>' | b'\\' | b'^' | b'`' | b'{' | b'|' | b'}' => false,
        _ => b.is_ascii_graphic() || !b.is_ascii(),
    })
}

/// Check the issuer field of credential `id` in the scope of `request`
pub fn check_issuer(
    resolver: &IssuerResolver,
    request: &ConfigRequest,
    id: &str,
    issuer: Option<&str>,
) -> FormValidation {
    let scope = resolver.for_config(request);

    let Some(issuer) = issuer.filter(|i| !i.is_empty()) else {
        return match scope {
            Some(scope) => FormValidation::ok(format!("Issuer URI: {}", scope.url())),
            None => FormValidation::warning("Unable to determine the issuer URI"),
        };
    };

    if let Some(invalid) = check_issuer_url(issuer) {
        return invalid;
    }

    let Some(scope) = scope else {
        return FormValidation::warning("Unable to determine where these credentials are being saved");
    };

    let saved = scope
        .credentials()
        .iter()
        .any(|c| c.id() == id && c.issuer() == Some(issuer));
    if saved {
        FormValidation::ok(format!(
            "Serve {issuer}{} with the well-known OpenID configuration for this issuer and \
             {issuer}{} with the JWKS of this credential (both as application/json). \
             Note that the JWKS document will need to be updated if you resave these credentials.",
            WELL_KNOWN_OPENID_CONFIGURATION, JWKS
        ))
    } else {
        FormValidation::ok("Save these credentials, then return to this screen for instructions")
    }
}

/// Discovery document to host at an external issuer URL
pub fn well_known_openid_configuration(issuer: &str) -> DiscoveryDocument {
    DiscoveryDocument::for_issuer(issuer)
}

/// JWKS to host at an external issuer URL for credential `id`.
///
/// `Ok(None)` when the scope or a credential with that id and override
/// cannot be found.
pub fn credential_jwks(
    resolver: &IssuerResolver,
    request: &ConfigRequest,
    id: &str,
    issuer: &str,
) -> Result<Option<JsonWebKeySet>> {
    let Some(scope) = resolver.for_config(request) else {
        return Ok(None);
    };
    let credentials = scope.credentials();
    let Some(credential) = credentials
        .iter()
        .find(|c| c.id() == id && c.issuer() == Some(issuer))
    else {
        return Ok(None);
    };
    JsonWebKeySet::for_credential(credential).map(Some)
}

/// Algorithms offered when creating a credential
pub fn algorithm_choices() -> Vec<&'static str> {
    KeyAlgorithm::ALL.iter().map(|a| a.name()).collect()
}
