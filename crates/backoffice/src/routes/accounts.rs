//! Account provisioning endpoints (administrative only).

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::middleware::RequireAdministrative;
use crate::services::AuthService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/accounts", post(provision))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
}

/// POST /api/accounts
///
/// Creates an account with `isPasswordSet=false`; the holder completes the
/// one-time password setup on first login.
async fn provision(
    RequireAdministrative(caller): RequireAdministrative,
    State(state): State<AppState>,
    Json(request): Json<ProvisionRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let accounts = state
        .accounts()
        .ok_or_else(|| AppError::Unavailable("account store unavailable".to_string()))?;

    AuthService::new(accounts)
        .provision(&request.email, request.name, &request.role)
        .await?;

    tracing::info!(
        provisioned_for = %request.email,
        by = %caller.id,
        "account provisioned"
    );
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}
