//! Administrative account provisioning and self-registration.

use axum::http::StatusCode;
use serde_json::json;

use coopworks_core::Role;
use coopworks_integration_tests::{TestApp, cookie_header, post_json};

async fn login_cookie(app: &TestApp, email: &str, password: &str) -> String {
    let body = json!({ "email": email, "password": password });
    let (status, headers, _) = app.send(post_json("/api/auth/login", &body, None)).await;
    assert_eq!(status, StatusCode::OK, "login failed for {email}");
    cookie_header(&headers)
}

// =============================================================================
// Provisioning (POST /api/accounts)
// =============================================================================

#[tokio::test]
async fn test_admin_can_provision_then_holder_sets_password() {
    let app = TestApp::new();
    app.seed_account("admin@coop.example", Role::Admin, "Sunrise42x")
        .await;
    let cookie = login_cookie(&app, "admin@coop.example", "Sunrise42x").await;

    let request = json!({ "email": "driver@coop.example", "name": "D. River", "role": "driver" });
    let (status, _, body) = app
        .send(post_json("/api/accounts", &request, Some(&cookie)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    // The holder cannot log in yet; they are routed into setup.
    let login = json!({ "email": "driver@coop.example", "password": "whatever" });
    let (status, _, body) = app.send(post_json("/api/auth/login", &login, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["needsPasswordSetup"], true);

    let setup = json!({ "email": "driver@coop.example", "password": "Roadworthy7" });
    let (status, _, _) = app
        .send(post_json("/api/auth/setup-password", &setup, None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let login = json!({ "email": "driver@coop.example", "password": "Roadworthy7" });
    let (status, _, body) = app.send(post_json("/api/auth/login", &login, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "driver");
}

#[tokio::test]
async fn test_provisioning_requires_an_administrative_session() {
    let app = TestApp::new();
    app.seed_account("member@coop.example", Role::Member, "Sunrise42x")
        .await;
    let cookie = login_cookie(&app, "member@coop.example", "Sunrise42x").await;

    let request = json!({ "email": "x@coop.example", "role": "member" });

    let (status, _, _) = app.send(post_json("/api/accounts", &request, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = app
        .send(post_json("/api/accounts", &request, Some(&cookie)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = TestApp::new();
    app.seed_account("admin@coop.example", Role::Admin, "Sunrise42x")
        .await;
    app.seed_account("taken@coop.example", Role::Member, "Sunrise42x")
        .await;
    let cookie = login_cookie(&app, "admin@coop.example", "Sunrise42x").await;

    // Same address up to case and whitespace.
    let request = json!({ "email": " Taken@coop.example ", "role": "operator" });
    let (status, _, body) = app
        .send(post_json("/api/accounts", &request, Some(&cookie)))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_role_is_rejected() {
    let app = TestApp::new();
    app.seed_account("admin@coop.example", Role::Admin, "Sunrise42x")
        .await;
    let cookie = login_cookie(&app, "admin@coop.example", "Sunrise42x").await;

    let request = json!({ "email": "y@coop.example", "role": "superuser" });
    let (status, _, _) = app
        .send(post_json("/api/accounts", &request, Some(&cookie)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Self-registration (POST /api/auth/register)
// =============================================================================

#[tokio::test]
async fn test_register_administrative_role_logs_straight_in() {
    let app = TestApp::new();

    let request = json!({
        "email": "sec@coop.example",
        "name": "S. Cretary",
        "role": "Secretary",
        "password": "Minutes2024",
    });
    let (status, headers, body) = app
        .send(post_json("/api/auth/register", &request, None))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["role"], "secretary");
    assert!(cookie_header(&headers).contains("coop_role=secretary"));
}

#[tokio::test]
async fn test_register_rejects_member_roles() {
    let app = TestApp::new();

    let request = json!({
        "email": "m@coop.example",
        "role": "member",
        "password": "Minutes2024",
    });
    let (status, _, _) = app
        .send(post_json("/api/auth/register", &request, None))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict() {
    let app = TestApp::new();
    app.seed_account("sec@coop.example", Role::Secretary, "Sunrise42x")
        .await;

    let request = json!({
        "email": "sec@coop.example",
        "role": "chairman",
        "password": "Minutes2024",
    });
    let (status, _, _) = app
        .send(post_json("/api/auth/register", &request, None))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}
