//! Guarded page surface.
//!
//! Rendering lives in a separate front end; the server's responsibility on
//! page navigations is the authorization decision. Every non-API path runs
//! through the navigation guard, and allowed paths answer with a small
//! placeholder the front end replaces.

use axum::{Router, http::Uri, middleware::from_fn, response::IntoResponse};

use crate::middleware::authorize_navigation;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .fallback(page)
        .layer(from_fn(authorize_navigation))
}

async fn page(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "page served");
    "coopworks back office"
}
