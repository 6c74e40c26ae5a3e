//! Navigation guard middleware and session extractors.
//!
//! The middleware applies the pure routing decision to every page
//! navigation; the extractors give API handlers typed access to the session
//! pair. API rejections are structured JSON, never redirects.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use coopworks_core::{AccountId, Role};

use crate::routing::{self, Decision};
use crate::session::{self, SessionAssertion};

/// The session pair as seen by an API handler.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    /// Asserted account id.
    pub id: AccountId,
    /// Asserted role.
    pub role: Role,
}

/// Guard every page navigation with the routing decision.
///
/// Allowed navigations pass through; everything else becomes a redirect. A
/// corrupt cookie pair is cleared on the way out so the client does not
/// keep replaying it.
pub async fn authorize_navigation(request: Request, next: Next) -> Response {
    let assertion = session::read(request.headers());

    match routing::decide(request.uri().path(), &assertion) {
        Decision::Allow => next.run(request).await,
        Decision::RedirectTo(target) => {
            tracing::debug!(
                path = %request.uri().path(),
                target = %target,
                "navigation redirected"
            );
            if assertion == SessionAssertion::Corrupt {
                (session::clear(), Redirect::to(&target)).into_response()
            } else {
                Redirect::to(&target).into_response()
            }
        }
    }
}

/// Rejection for the session extractors.
#[derive(Debug)]
pub enum SessionRejection {
    /// No usable session pair on an API call.
    Unauthenticated,
    /// Session present but the role lacks the required partition.
    Forbidden,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "authentication required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "administrative role required"),
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// Extractor requiring a well-formed session pair.
pub struct RequireSession(pub CurrentSession);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session::read(&parts.headers) {
            SessionAssertion::User { id, role } => Ok(Self(CurrentSession { id, role })),
            SessionAssertion::Anonymous | SessionAssertion::Corrupt => {
                Err(SessionRejection::Unauthenticated)
            }
        }
    }
}

/// Extractor requiring a session with an administrative role.
pub struct RequireAdministrative(pub CurrentSession);

impl<S> FromRequestParts<S> for RequireAdministrative
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireSession(current) = RequireSession::from_request_parts(parts, state).await?;
        if !current.role.is_administrative() {
            return Err(SessionRejection::Forbidden);
        }
        Ok(Self(current))
    }
}
