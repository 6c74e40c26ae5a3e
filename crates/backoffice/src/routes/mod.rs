//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /api/auth/login          - Verify credentials, establish session pair
//! POST /api/auth/logout         - Clear the session pair
//! POST /api/auth/setup-password - First-time password setup
//! POST /api/auth/register       - Administrative self-registration
//! GET  /api/auth/session        - Revalidate the session pair on app load
//!
//! # Accounts (administrative)
//! POST /api/accounts            - Provision an account (password deferred)
//!
//! # Pages
//! *                             - Guarded page fallback
//! ```
//!
//! Auth endpoints only accept their stated method; anything else gets a
//! structured 405 rather than an empty body.

use axum::Router;

use crate::state::AppState;

pub mod accounts;
pub mod auth;
pub mod pages;

/// All API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(auth::routes()).merge(accounts::routes())
}
