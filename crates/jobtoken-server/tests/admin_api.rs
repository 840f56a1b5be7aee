//! Integration tests for the admin API

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

mod common;
use common::{get, TestApp, EXTERNAL_ISSUER};

const ADMIN_KEY: &str = "test-admin-key-for-admin-tests";

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Admin-Key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_admin_auth() {
    let app = TestApp::new(Some(ADMIN_KEY));

    let res = app.router().oneshot(get("/admin/algorithms")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "no header should be 401");

    let res = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/admin/algorithms")
                .header("X-Admin-Key", "wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "wrong key should be 401");

    let (status, json) = app.get_json(admin_get("/admin/algorithms")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!(["ES256", "ES384", "ES512", "RS256", "RS384", "RS512"])
    );

    // Public metadata never needs the key
    let (status, _) = app.get_json(get("/oidc/jwks")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_disabled_without_key() {
    let app = TestApp::new(None);

    let res = app.router().oneshot(get("/admin/algorithms")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Scope existence must not be observable through check-issuer
    for scope in ["/job/team", "/job/missing"] {
        let uri = format!(
            "/admin/check-issuer?scope={}&id=x&issuer=https%3A%2F%2Fissuer.example",
            scope
        );
        let (status, json) = app.get_json(get(&uri)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{}", scope);
        assert_eq!(json, serde_json::Value::Null);
    }

    // Even a guessed key is refused
    let res = app.router().oneshot(admin_get("/admin/algorithms")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = app.get_json(get("/oidc/jwks")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_check_issuer() {
    let app = TestApp::new(Some(ADMIN_KEY));

    let (status, json) = app
        .get_json(admin_get("/admin/check-issuer?scope=/job/team&id=new"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["kind"], "ok");
    assert_eq!(json["message"], "Issuer URI: https://ci.example.org/oidc/job/team");

    let (_, json) = app
        .get_json(admin_get(
            "/admin/check-issuer?scope=/job/team&id=new&issuer=http%3A%2F%2Fissuer.example",
        ))
        .await;
    assert_eq!(json["kind"], "error");
    assert_eq!(json["message"], "Issuer URIs should use https scheme");

    let (_, json) = app
        .get_json(admin_get(
            "/admin/check-issuer?scope=/job/team&id=team-ext&issuer=https%3A%2F%2Fissuer.example%2Fci",
        ))
        .await;
    assert_eq!(json["kind"], "ok");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("https://issuer.example/ci/jwks"));

    let (_, json) = app
        .get_json(admin_get(
            "/admin/check-issuer?scope=/job/missing&id=x&issuer=https%3A%2F%2Fissuer.example",
        ))
        .await;
    assert_eq!(json["kind"], "warning");
}

#[tokio::test]
async fn test_external_issuer_documents() {
    let app = TestApp::new(Some(ADMIN_KEY));

    let (status, json) = app
        .get_json(admin_get(
            "/admin/well-known-openid-configuration?issuer=https%3A%2F%2Fissuer.example%2Fci",
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["issuer"], EXTERNAL_ISSUER);
    assert_eq!(json["jwks_uri"], "https://issuer.example/ci/jwks");

    let (status, json) = app
        .get_json(admin_get(
            "/admin/jwks?scope=/job/team&id=team-ext&issuer=https%3A%2F%2Fissuer.example%2Fci",
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let keys = json["keys"].as_array().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["kid"], "team-ext");
    assert_eq!(keys[0]["crv"], "P-384");

    let (status, _) = app
        .get_json(admin_get(
            "/admin/jwks?scope=/job/team&id=team-ec&issuer=https%3A%2F%2Fissuer.example%2Fci",
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
