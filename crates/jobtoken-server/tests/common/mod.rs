//! Test utilities for integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use jobtoken_core::KeyAlgorithm;
use jobtoken_crypto::{KeyManager, MasterKeyCipher};
use jobtoken_oidc::{Credential, OidcConfig};
use jobtoken_server::state::AppState;
use jobtoken_server::store::{CredentialStore, StoreFile};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const ROOT_URL: &str = "https://ci.example.org";
pub const EXTERNAL_ISSUER: &str = "https://issuer.example/ci";

/// Test application wrapper
pub struct TestApp {
    router: Router,
    pub store: CredentialStore,
}

impl TestApp {
    /// Store layout:
    /// - root: `root-rsa` (RS256)
    /// - `/job/team`: `team-ec` (ES256) and `team-ext` (ES384, external issuer)
    /// - `/job/ext`: `ext-only` (ES256, external issuer)
    pub fn new(admin_key: Option<&str>) -> Self {
        let keys = KeyManager::new(Arc::new(MasterKeyCipher::new(&[7u8; 32])));
        let generate = |id: &str, algorithm| Credential::generate(id, algorithm, &keys).unwrap();

        let mut file = StoreFile::default();
        file.save_credential("", generate("root-rsa", KeyAlgorithm::Rs256).to_record());
        file.save_credential("/job/team", generate("team-ec", KeyAlgorithm::Es256).to_record());
        file.save_credential(
            "/job/team",
            generate("team-ext", KeyAlgorithm::Es384)
                .with_issuer(Some(EXTERNAL_ISSUER.into()))
                .to_record(),
        );
        file.save_credential(
            "/job/ext",
            generate("ext-only", KeyAlgorithm::Es256)
                .with_issuer(Some(EXTERNAL_ISSUER.into()))
                .to_record(),
        );

        let (store, _) =
            CredentialStore::restore(&mut file, &OidcConfig::new(ROOT_URL), &keys).unwrap();
        let state = AppState::new(store.resolver(), admin_key.map(str::to_string));
        let router = jobtoken_server::create_router(state);

        Self { router, store }
    }

    /// Get the router for making requests
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// GET `uri`, returning the status and the body parsed as JSON
    pub async fn get_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
