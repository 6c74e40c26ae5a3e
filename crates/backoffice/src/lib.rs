//! CoopWorks back office server.
//!
//! Credential verification, client-held session issuance, and role-based
//! route authorization for a cooperative society's staff and members.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Accounts in a remote document store behind a thin REST gateway
//!   (in-memory backend for development and tests)
//! - PBKDF2-HMAC-SHA256 password hashing with a one-time setup flow for
//!   provisioned accounts
//! - Unsigned two-cookie session pair, revalidated against the store on
//!   full application load

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{Router, extract::State, http::StatusCode, routing::get};

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod routing;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use config::BackofficeConfig;
pub use state::AppState;

/// Build the full application router.
///
/// API routes are registered before the guarded page fallback so the
/// navigation guard never sees `/api/**`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::api_routes())
        .merge(routes::pages::routes())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable when no account store is configured.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.accounts().is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
