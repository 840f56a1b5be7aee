//! Public HTTP route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use jobtoken_oidc::{metadata, MetadataResponse, OidcError};

use crate::state::AppState;

/// Error body shared by every handler
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, description) = match self {
            ApiError::NotFound(description) => (StatusCode::NOT_FOUND, "not_found", description),
            ApiError::Internal(description) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "server_error", description)
            }
        };
        (
            status,
            Json(serde_json::json!({
                "error": error,
                "error_description": description,
            })),
        )
            .into_response()
    }
}

impl From<OidcError> for ApiError {
    fn from(e: OidcError) -> Self {
        match e {
            OidcError::IssuerNotFound { .. } => ApiError::NotFound(e.to_string()),
            e => {
                tracing::error!("Request failed: {}", e);
                ApiError::Internal(e.to_string())
            }
        }
    }
}

/// `GET /oidc/*path`: discovery document or JWKS of the issuer at `path`
pub async fn issuer_metadata(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<MetadataResponse>, ApiError> {
    let path = format!("/{}", path.trim_start_matches('/'));
    metadata::resolve(&state.resolver, &path)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No issuer metadata at {}", path)))
}

/// Health check
pub async fn health() -> &'static str {
    "OK"
}
