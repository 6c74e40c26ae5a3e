//! Authentication endpoints.
//!
//! Login deliberately collapses "no such account" and "wrong password"
//! into one generic 401 so responses cannot be used to enumerate emails.
//! The provisioned-but-unset case is the exception: it answers with
//! `needsPasswordSetup` so the client can route into the setup flow.

use axum::{
    Json, Router,
    extract::State,
    extract::rejection::JsonRejection,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use coopworks_core::Identity;

use crate::services::{AuthError, AuthService};
use crate::session::{self, SessionAssertion};
use crate::state::AppState;
use crate::store::StoreError;

/// Generic credential failure message. Identical for unknown email and
/// wrong password.
const GENERIC_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

const STORE_UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable. Please try again.";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login).fallback(method_not_allowed))
        .route("/api/auth/logout", post(logout).fallback(method_not_allowed))
        .route(
            "/api/auth/setup-password",
            post(setup_password).fallback(method_not_allowed),
        )
        .route(
            "/api/auth/register",
            post(register).fallback(method_not_allowed),
        )
        .route(
            "/api/auth/session",
            get(restore_session).fallback(method_not_allowed),
        )
}

/// Structured 405 for wrong methods on auth endpoints.
async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "success": false, "error": "method not allowed" })),
    )
        .into_response()
}

/// Structured 400 for bodies that fail to deserialize.
fn malformed_body(rejection: &JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": rejection.body_text() })),
    )
        .into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}

fn store_unavailable() -> Response {
    failure(StatusCode::SERVICE_UNAVAILABLE, STORE_UNAVAILABLE_MESSAGE)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&Identity> for UserPayload {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            email: identity.email.as_str().to_string(),
            name: identity.display_name.clone(),
            last_login: identity.last_login,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_password_setup: Option<bool>,
}

impl LoginResponse {
    fn for_identity(identity: &Identity) -> Self {
        Self {
            success: true,
            user: Some(UserPayload::from(identity)),
            role: Some(identity.role.as_str().to_string()),
            error: None,
            needs_password_setup: None,
        }
    }
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(&rejection),
    };
    let Some(accounts) = state.accounts() else {
        return store_unavailable();
    };

    match AuthService::new(accounts)
        .verify_credentials(&request.email, &request.password)
        .await
    {
        Ok(identity) => (
            session::issue(&identity),
            Json(LoginResponse::for_identity(&identity)),
        )
            .into_response(),
        Err(err) => login_failure(&err),
    }
}

fn login_failure(err: &AuthError) -> Response {
    match err {
        AuthError::InvalidInput(message) => failure(StatusCode::BAD_REQUEST, message),
        // One message for both, so the response cannot confirm whether the
        // email exists.
        AuthError::AccountNotFound | AuthError::InvalidCredentials => {
            failure(StatusCode::UNAUTHORIZED, GENERIC_CREDENTIALS_MESSAGE)
        }
        AuthError::PasswordNotSet => Json(LoginResponse {
            success: false,
            user: None,
            role: None,
            error: None,
            needs_password_setup: Some(true),
        })
        .into_response(),
        AuthError::RoleMissing => failure(
            StatusCode::FORBIDDEN,
            "Your account has no role assigned. Contact an administrator.",
        ),
        AuthError::RoleInvalid(_) => failure(
            StatusCode::FORBIDDEN,
            "Your account role is not recognized. Contact an administrator.",
        ),
        AuthError::ServiceUnavailable => store_unavailable(),
        AuthError::AlreadySet | AuthError::EmailTaken => {
            tracing::error!(error = %err, "unexpected login failure");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// POST /api/auth/logout
///
/// Stateless on the server; just expires both cookie halves.
async fn logout() -> Response {
    (session::clear(), Json(json!({ "success": true }))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SetupPasswordRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/setup-password
async fn setup_password(
    State(state): State<AppState>,
    payload: Result<Json<SetupPasswordRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(&rejection),
    };
    let Some(accounts) = state.accounts() else {
        return store_unavailable();
    };

    match AuthService::new(accounts)
        .setup_password(&request.email, &request.password)
        .await
    {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(AuthError::AccountNotFound) => {
            failure(StatusCode::NOT_FOUND, "No account found for this email.")
        }
        Err(AuthError::AlreadySet) => failure(
            StatusCode::BAD_REQUEST,
            "A password is already set for this account.",
        ),
        Err(AuthError::InvalidInput(message)) => failure(StatusCode::BAD_REQUEST, &message),
        Err(AuthError::ServiceUnavailable) => store_unavailable(),
        Err(err) => {
            tracing::error!(error = %err, "unexpected setup failure");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
    pub password: String,
}

/// POST /api/auth/register
///
/// Administrative self-registration. Creates the account with the password
/// already hashed and logs the caller straight in.
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(&rejection),
    };
    let Some(accounts) = state.accounts() else {
        return store_unavailable();
    };

    match AuthService::new(accounts)
        .register(&request.email, request.name, &request.role, &request.password)
        .await
    {
        Ok(identity) => (
            StatusCode::CREATED,
            session::issue(&identity),
            Json(LoginResponse::for_identity(&identity)),
        )
            .into_response(),
        Err(AuthError::EmailTaken) => failure(
            StatusCode::CONFLICT,
            "An account with this email already exists.",
        ),
        Err(AuthError::InvalidInput(message)) => failure(StatusCode::BAD_REQUEST, &message),
        Err(AuthError::ServiceUnavailable) => store_unavailable(),
        Err(err) => {
            tracing::error!(error = %err, "unexpected registration failure");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

const UNAUTHENTICATED: SessionResponse = SessionResponse {
    authenticated: false,
    user: None,
    role: None,
};

/// GET /api/auth/session
///
/// Full-application-load revalidation of the cookie pair. The pair is
/// checked against the store; any mismatch (account gone, role changed,
/// password revoked) clears it and reports unauthenticated.
async fn restore_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, role) = match session::read(&headers) {
        SessionAssertion::Anonymous => return Json(UNAUTHENTICATED).into_response(),
        SessionAssertion::Corrupt => {
            return (session::clear(), Json(UNAUTHENTICATED)).into_response();
        }
        SessionAssertion::User { id, role } => (id, role),
    };
    let Some(accounts) = state.accounts() else {
        return store_unavailable();
    };

    match accounts.get_by_id(&id).await {
        Ok(Some(account)) if account.password_set && account.parsed_role() == Some(role) => {
            let identity = Identity {
                id: account.id,
                email: account.email,
                display_name: account.display_name,
                role,
                last_login: account.last_login,
            };
            Json(SessionResponse {
                authenticated: true,
                user: Some(UserPayload::from(&identity)),
                role: Some(role.as_str().to_string()),
            })
            .into_response()
        }
        // Account missing, password revoked, or role drifted: the asserted
        // pair is stale, drop it.
        Ok(_) => (session::clear(), Json(UNAUTHENTICATED)).into_response(),
        Err(StoreError::Decode(message)) => {
            tracing::error!(account = %id, error = %message, "corrupt account during revalidation");
            (session::clear(), Json(UNAUTHENTICATED)).into_response()
        }
        Err(_) => store_unavailable(),
    }
}
