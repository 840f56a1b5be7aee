//! Integration tests for the public metadata endpoints

use axum::http::StatusCode;
use tower::ServiceExt;

mod common;
use common::{get, TestApp};

#[tokio::test]
async fn test_root_discovery_endpoint() {
    let app = TestApp::new(None);

    let (status, json) = app
        .get_json(get("/oidc/.well-known/openid-configuration"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["issuer"], "https://ci.example.org/oidc");
    assert_eq!(json["jwks_uri"], "https://ci.example.org/oidc/jwks");
    assert_eq!(json["response_types_supported"], serde_json::json!(["code"]));
    assert_eq!(json["subject_types_supported"], serde_json::json!(["public"]));
    assert_eq!(
        json["id_token_signing_alg_values_supported"],
        serde_json::json!(["RS256"])
    );
    assert_eq!(json["authorization_endpoint"], "https://unimplemented");
    assert_eq!(json["token_endpoint"], "https://unimplemented");
}

#[tokio::test]
async fn test_scoped_discovery_endpoint() {
    let app = TestApp::new(None);

    let (status, json) = app
        .get_json(get("/oidc/job/team/.well-known/openid-configuration"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["issuer"], "https://ci.example.org/oidc/job/team");
    assert_eq!(json["jwks_uri"], "https://ci.example.org/oidc/job/team/jwks");
}

#[tokio::test]
async fn test_root_jwks_endpoint() {
    let app = TestApp::new(None);

    let (status, json) = app.get_json(get("/oidc/jwks")).await;

    assert_eq!(status, StatusCode::OK);
    let keys = json["keys"].as_array().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["kid"], "root-rsa");
    assert_eq!(keys[0]["kty"], "RSA");
    assert_eq!(keys[0]["alg"], "RS256");
    assert_eq!(keys[0]["use"], "sig");
    assert_eq!(keys[0]["e"], "AQAB");
}

#[tokio::test]
async fn test_scoped_jwks_skips_external_credentials() {
    let app = TestApp::new(None);

    let (status, json) = app.get_json(get("/oidc/job/team/jwks")).await;

    assert_eq!(status, StatusCode::OK);
    let keys = json["keys"].as_array().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["kid"], "team-ec");
    assert_eq!(keys[0]["crv"], "P-256");
}

#[tokio::test]
async fn test_jwks_not_found_without_default_credentials() {
    let app = TestApp::new(None);

    let (status, json) = app.get_json(get("/oidc/job/ext/jwks")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");

    // Discovery for the same scope is still served
    let (status, _) = app
        .get_json(get("/oidc/job/ext/.well-known/openid-configuration"))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_paths_not_found() {
    let app = TestApp::new(None);

    for uri in [
        "/oidc/job/nowhere/jwks",
        "/oidc/job/team",
        "/oidc/job/team/keys",
        "/oidc/job/team/jwks/extra",
    ] {
        let (status, _) = app.get_json(get(uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let app = TestApp::new(None);

    let response = app.router().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_issued_token_matches_published_jwks() {
    use jobtoken_core::ExecutionContext;
    use jobtoken_oidc::{OidcConfig, TokenIssuer};
    use std::sync::Arc;

    let app = TestApp::new(None);
    let issuer = TokenIssuer::new(
        Arc::new(app.store.resolver()),
        OidcConfig::new(common::ROOT_URL),
    );
    let credential = app.store.credential("/job/team", "team-ec").unwrap();
    let context =
        ExecutionContext::new("https://ci.example.org/job/team/job/app/", 12).in_scope("/job/team");

    let token = issuer.issue(&credential, Some(&context)).unwrap();
    assert_eq!(token.claims.iss, "https://ci.example.org/oidc/job/team");
    assert_eq!(token.claims.build_number, Some(12));

    // The issuer advertised in the token serves the signing key
    let (status, json) = app.get_json(get("/oidc/job/team/jwks")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["keys"]
        .as_array()
        .unwrap()
        .iter()
        .any(|k| k["kid"] == "team-ec"));
}
