//! End-to-end tests for the HTTP layer.
//!
//! Everything runs against the in-memory repositories; no database
//! required.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use anchorage::api::axum::{auth_routes, AppState};
use anchorage::config::AuthConfig;
use anchorage::mailer::MockMailer;
use anchorage::session::InMemorySessionStore;
use anchorage::{MockAuditLogRepository, MockNotificationRepository, MockUserRepository};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    users: MockUserRepository,
    mailer: MockMailer,
}

fn create_app() -> TestApp {
    create_app_with_mailer(MockMailer::new())
}

fn create_app_with_mailer(mailer: MockMailer) -> TestApp {
    let users = MockUserRepository::new();
    let state = AppState {
        user_repo: users.clone(),
        audit_log: MockAuditLogRepository::new(),
        notification_repo: MockNotificationRepository::new(),
        sessions: InMemorySessionStore::new(),
        mailer: mailer.clone(),
        // low hashing cost to keep the suite fast
        config: AuthConfig {
            bcrypt_cost: 4,
            ..AuthConfig::default()
        },
    };

    let app = Router::new()
        .merge(auth_routes::<
            MockUserRepository,
            MockAuditLogRepository,
            MockNotificationRepository,
            InMemorySessionStore,
            MockMailer,
        >())
        .with_state(state);

    TestApp { app, users, mailer }
}

async fn body_to_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn signup_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "first_name": "Test",
        "last_name": "User",
        "email": email,
        "password": "securepassword",
    })
}

/// Signs up and logs in, returning the session token.
async fn signup_and_login(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/signup", None, &signup_body(email)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            None,
            &serde_json::json!({ "email": email, "password": "securepassword" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    body["token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_signup_success() {
    let harness = create_app();

    let response = harness
        .app
        .oneshot(json_request(
            "POST",
            "/signup",
            None,
            &signup_body("test@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["email"], "test@example.com");
    assert_eq!(body["role"], "staff");
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn test_signup_duplicate_email_is_conflict() {
    let harness = create_app();

    let first = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/signup",
            None,
            &signup_body("test@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // same address, different case
    let second = harness
        .app
        .oneshot(json_request(
            "POST",
            "/signup",
            None,
            &signup_body("Test@Example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = body_to_json(second.into_body()).await;
    assert_eq!(body["code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn test_signup_validation_reports_every_field() {
    let harness = create_app();

    let response = harness
        .app
        .oneshot(json_request(
            "POST",
            "/signup",
            None,
            &serde_json::json!({
                "first_name": "",
                "last_name": "User",
                "email": "notanemail",
                "password": "short",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
    assert!(fields.contains(&"first_name"));
}

#[tokio::test]
async fn test_login_and_authenticated_request() {
    let harness = create_app();
    let token = signup_and_login(&harness.app, "test@example.com").await;

    let response = harness
        .app
        .oneshot(get_request("/notifications", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["unread_count"], 0);
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let harness = create_app();
    signup_and_login(&harness.app, "test@example.com").await;

    let response = harness
        .app
        .oneshot(json_request(
            "POST",
            "/login",
            None,
            &serde_json::json!({ "email": "test@example.com", "password": "wrongpassword" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_private_routes_require_a_session() {
    let harness = create_app();

    let response = harness
        .app
        .clone()
        .oneshot(get_request("/notifications", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = harness
        .app
        .oneshot(get_request("/notifications", Some("bogus-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_the_session() {
    let harness = create_app();
    let token = signup_and_login(&harness.app, "test@example.com").await;

    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/logout",
            Some(&token),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = harness
        .app
        .oneshot(get_request("/notifications", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_full_flow() {
    let harness = create_app();
    let token = signup_and_login(&harness.app, "test@example.com").await;

    // wrong current password is a bad request, not unauthorized
    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/change-password",
            Some(&token),
            &serde_json::json!({
                "current_password": "wrongpassword",
                "new_password": "newsecurepassword",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/change-password",
            Some(&token),
            &serde_json::json!({
                "current_password": "securepassword",
                "new_password": "newsecurepassword",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // the new password logs in
    let response = harness
        .app
        .oneshot(json_request(
            "POST",
            "/login",
            None,
            &serde_json::json!({
                "email": "test@example.com",
                "password": "newsecurepassword",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reset_password_full_flow() {
    let harness = create_app();
    signup_and_login(&harness.app, "test@example.com").await;

    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/reset-password",
            None,
            &serde_json::json!({ "email": "test@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // the token travels by mail, never in the response
    let token = harness.mailer.sent.lock().unwrap()[0].token.clone();

    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/reset-password/confirm",
            None,
            &serde_json::json!({ "token": token, "password": "resetpassword" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = harness
        .app
        .oneshot(json_request(
            "POST",
            "/login",
            None,
            &serde_json::json!({ "email": "test@example.com", "password": "resetpassword" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reset_password_confirm_bad_token() {
    let harness = create_app();

    let response = harness
        .app
        .oneshot(json_request(
            "POST",
            "/reset-password/confirm",
            None,
            &serde_json::json!({ "token": "nonsense", "password": "resetpassword" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["code"], "INVALID_OR_EXPIRED_TOKEN");
}

#[tokio::test]
async fn test_reset_password_delivery_failure_is_a_server_error() {
    let harness = create_app_with_mailer(MockMailer::failing());
    signup_and_login(&harness.app, "test@example.com").await;

    let response = harness
        .app
        .oneshot(json_request(
            "POST",
            "/reset-password",
            None,
            &serde_json::json!({ "email": "test@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["code"], "EMAIL_DELIVERY_FAILED");
    // the transport detail stays in the logs
    assert!(!body["error"].as_str().unwrap().contains("smtp"));
}

#[tokio::test]
async fn test_notification_crud() {
    let harness = create_app();
    let token = signup_and_login(&harness.app, "test@example.com").await;

    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/notifications",
            Some(&token),
            &serde_json::json!({
                "title": "Invoice overdue",
                "message": "Invoice INV-1042 is 3 days overdue",
                "type": "warning",
                "module": "accounting",
                "related_id": 1042,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_to_json(response.into_body()).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["type"], "warning");
    assert_eq!(created["read"], false);

    let response = harness
        .app
        .clone()
        .oneshot(get_request("/notifications", Some(&token)))
        .await
        .unwrap();
    let listed = body_to_json(response.into_body()).await;
    assert_eq!(listed["unread_count"], 1);
    assert_eq!(listed["notifications"].as_array().unwrap().len(), 1);

    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/notifications/{id}"),
            Some(&token),
            &serde_json::json!({ "read": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_to_json(response.into_body()).await;
    assert_eq!(updated["read"], true);

    let response = harness
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/notifications/{id}"))
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = harness
        .app
        .oneshot(get_request("/notifications", Some(&token)))
        .await
        .unwrap();
    let listed = body_to_json(response.into_body()).await;
    assert_eq!(listed["notifications"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_notification_bad_type_rejected() {
    let harness = create_app();
    let token = signup_and_login(&harness.app, "test@example.com").await;

    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/notifications",
            Some(&token),
            &serde_json::json!({
                "title": "Hello",
                "message": "World",
                "type": "catastrophe",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // nothing persisted
    let response = harness
        .app
        .oneshot(get_request("/notifications", Some(&token)))
        .await
        .unwrap();
    let listed = body_to_json(response.into_body()).await;
    assert_eq!(listed["notifications"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_audit_log_requires_management_role() {
    let harness = create_app();
    let token = signup_and_login(&harness.app, "staff@example.com").await;

    let response = harness
        .app
        .clone()
        .oneshot(get_request("/audit-log", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // promote the user and try again
    {
        let mut users = harness.users.users.lock().unwrap();
        users[0].role = anchorage::Role::Management;
    }

    let response = harness
        .app
        .oneshot(get_request("/audit-log?action=LOGIN", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    let entries = body["entries"].as_array().unwrap();
    assert!(!entries.is_empty());
    assert!(entries.iter().all(|e| e["action"] == "LOGIN"));
}
