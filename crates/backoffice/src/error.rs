//! Unified error handling for the back office API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::AuthError;
use crate::store::StoreError;

/// Application-level error type for API handlers.
///
/// Authentication endpoints shape their own responses (see
/// `routes::auth`); this type covers everything else.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A backing service is not reachable or not configured.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidInput(message) => Self::BadRequest(message),
            AuthError::AccountNotFound => Self::NotFound("account not found".to_string()),
            AuthError::EmailTaken => {
                Self::Conflict("an account with this email already exists".to_string())
            }
            AuthError::AlreadySet => {
                Self::Conflict("password is already set for this account".to_string())
            }
            AuthError::ServiceUnavailable => {
                Self::Unavailable("account store unavailable".to_string())
            }
            AuthError::PasswordNotSet
            | AuthError::InvalidCredentials
            | AuthError::RoleMissing
            | AuthError::RoleInvalid(_) => Self::Internal(format!("unexpected auth error: {err}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Store(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "back office request error"
            );
        }

        let status = match &self {
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
