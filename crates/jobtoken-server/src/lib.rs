//! jobtoken Server Library
//!
//! HTTP surface of the jobtoken OIDC provider: per-issuer discovery
//! documents and JWKS under `/oidc`, plus the admin helpers used when
//! configuring credentials. The library exposes modules for integration
//! testing while the binary handles startup.

pub mod admin;
pub mod config;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

use axum::{middleware as axum_middleware, routing::get, Router};
use jobtoken_oidc::config::URL_NAME;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Create the admin sub-router (behind auth middleware)
fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/check-issuer", get(admin::check_issuer))
        .route(
            "/well-known-openid-configuration",
            get(admin::well_known_openid_configuration),
        )
        .route("/jwks", get(admin::jwks))
        .route("/algorithms", get(admin::algorithms))
        .layer(axum_middleware::from_fn_with_state(
            state,
            admin::admin_auth_middleware,
        ))
}

/// Metadata is fetched by relying parties from anywhere.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([axum::http::Method::GET])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Create the main router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(&format!("/{}/*path", URL_NAME), get(routes::issuer_metadata))
        .route("/health", get(routes::health))
        .nest("/admin", admin_router(state.clone()))
        .with_state(state)
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
