//! Integration test harness for the CoopWorks back office.
//!
//! Tests run against the real router in process, with the in-memory store
//! backend. No network, no external document store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p coopworks-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use coopworks_backoffice::config::BackofficeConfig;
use coopworks_backoffice::models::NewAccount;
use coopworks_backoffice::services::password;
use coopworks_backoffice::store::{AccountRepository, DocumentStore, Fields, MemoryStore};
use coopworks_backoffice::{AppState, app};
use coopworks_core::{AccountId, Email, Role};

/// Configuration for an in-process test app. The bind address is never
/// used; requests go straight into the router.
#[must_use]
pub fn test_config() -> BackofficeConfig {
    BackofficeConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        store: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}

/// An in-process back office with a fresh in-memory store.
pub struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::with_store(test_config(), store.clone() as Arc<dyn DocumentStore>);
        Self {
            router: app(state),
            store,
        }
    }

    /// An app with no store backend at all, as when store credentials are
    /// missing from the environment.
    #[must_use]
    pub fn degraded() -> Router {
        let state = AppState::new(test_config()).expect("state without a store always builds");
        app(state)
    }

    fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.store.clone() as Arc<dyn DocumentStore>)
    }

    /// Seed an account that has completed password setup.
    pub async fn seed_account(&self, email: &str, role: Role, password_text: &str) {
        let email = Email::parse(email).expect("valid seed email");
        let derived = password::hash_password(password_text)
            .await
            .expect("hashing succeeds");
        self.accounts()
            .create(NewAccount {
                email,
                display_name: Some("Test Person".to_string()),
                role,
                password: Some((derived.salt, derived.derived_key)),
            })
            .await
            .expect("seed create succeeds");
    }

    /// Seed a provisioned account that has not set a password yet.
    pub async fn seed_provisioned(&self, email: &str, role: Role) {
        let email = Email::parse(email).expect("valid seed email");
        self.accounts()
            .create(NewAccount {
                email,
                display_name: None,
                role,
                password: None,
            })
            .await
            .expect("seed create succeeds");
    }

    /// Seed a pre-hashing account that still stores its raw password.
    pub async fn seed_legacy(&self, email: &str, role: Role, password_text: &str) {
        let parsed = Email::parse(email).expect("valid seed email");
        let id = AccountId::for_email(&parsed);

        let mut fields = Fields::new();
        fields.insert("email".to_string(), Value::from(parsed.normalized()));
        fields.insert("role".to_string(), Value::from(role.as_str()));
        fields.insert("password".to_string(), Value::from(password_text));
        fields.insert("isPasswordSet".to_string(), Value::from(true));
        self.store
            .set_merge("accounts", id.as_str(), fields)
            .await
            .expect("seed write succeeds");
    }

    /// Fire a request and return status, headers, and the JSON body (or
    /// `Value::Null` for non-JSON bodies).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        send(&self.router, request).await
    }
}

/// Fire a request at a router and return status, headers, and the JSON body
/// (or `Value::Null` for non-JSON bodies).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read succeeds");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

/// Build a GET request, optionally with a `Cookie` header.
#[must_use]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("valid request")
}

/// Build a JSON POST request, optionally with a `Cookie` header.
#[must_use]
pub fn post_json(uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Collapse a response's `Set-Cookie` headers into a `Cookie` header value.
#[must_use]
pub fn cookie_header(headers: &HeaderMap) -> String {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Whether the response expires both halves of the session pair.
#[must_use]
pub fn clears_session(headers: &HeaderMap) -> bool {
    let cookies: Vec<&str> = headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    cookies
        .iter()
        .any(|c| c.starts_with("coop_uid=") && c.contains("Max-Age=0"))
        && cookies
            .iter()
            .any(|c| c.starts_with("coop_role=") && c.contains("Max-Age=0"))
}
