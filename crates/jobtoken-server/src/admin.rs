//! Admin API routes backing the credential configuration screen
//!
//! Every admin endpoint requires the configured admin key in the
//! `X-Admin-Key` header. Without a configured key the endpoints answer 503.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{Json, Response},
};
use jobtoken_oidc::{admin, ConfigRequest, DiscoveryDocument, FormValidation, JsonWebKeySet};
use serde::Deserialize;

use crate::routes::ApiError;
use crate::state::AppState;

// ── Auth middleware ──────────────────────────────────────────────

/// Admin API key authentication middleware.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(admin_key) = &state.admin_key else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let provided = request
        .headers()
        .get("X-Admin-Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if provided != admin_key.as_ref() {
        tracing::warn!(path = %request.uri().path(), "Rejected admin request");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

// ── Parameters ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CredentialParams {
    /// URI of the scope being configured, empty for the root
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub issuer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IssuerParams {
    pub issuer: String,
}

// ── Handlers ────────────────────────────────────────────────────

/// `GET /admin/check-issuer`
pub async fn check_issuer(
    State(state): State<AppState>,
    Query(params): Query<CredentialParams>,
) -> Json<FormValidation> {
    Json(admin::check_issuer(
        &state.resolver,
        &ConfigRequest::new(params.scope),
        &params.id,
        params.issuer.as_deref(),
    ))
}

/// `GET /admin/well-known-openid-configuration`
pub async fn well_known_openid_configuration(
    Query(params): Query<IssuerParams>,
) -> Json<DiscoveryDocument> {
    Json(admin::well_known_openid_configuration(&params.issuer))
}

/// `GET /admin/jwks`
pub async fn jwks(
    State(state): State<AppState>,
    Query(params): Query<CredentialParams>,
) -> Result<Json<JsonWebKeySet>, ApiError> {
    let issuer = params.issuer.unwrap_or_default();
    admin::credential_jwks(
        &state.resolver,
        &ConfigRequest::new(params.scope),
        &params.id,
        &issuer,
    )?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("No credential {} served from {}", params.id, issuer)))
}

/// `GET /admin/algorithms`
pub async fn algorithms() -> Json<Vec<&'static str>> {
    Json(admin::algorithm_choices())
}
