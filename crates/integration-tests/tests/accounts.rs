//! Integration tests for the account endpoints.

use axum::http::StatusCode;
use serde_json::json;

use cartwise_integration_tests::{ScriptedGenerator, TEST_PASSWORD, TestApp};

fn app() -> TestApp {
    TestApp::new(ScriptedGenerator::replying("hi"))
}

#[tokio::test]
async fn test_register_returns_created_user() {
    let app = app();
    let mut client = app.client();

    let body = client.register("  New.Shopper@Example.com ").await.json();

    assert_eq!(body["status"], "success");
    assert_eq!(body["user"]["email"], "new.shopper@example.com");
    assert!(body["user"]["id"].is_i64());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = app();
    app.client().register("shopper@example.com").await;

    let response = app
        .client()
        .post_json(
            "/api/auth/register",
            &json!({"email": "SHOPPER@example.com", "password": TEST_PASSWORD}),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        response.json(),
        json!({"error": "An account with this email already exists"})
    );
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let app = app();
    let mut client = app.client();

    let cases = [
        json!({"email": "not-an-email", "password": TEST_PASSWORD}),
        json!({"email": "shopper@example.com", "password": "short"}),
        json!({"email": "shopper@example.com"}),
    ];

    for body in cases {
        let response = client.post_json("/api/auth/register", &body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response.json()["error"].is_string());
    }
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = app();
    app.client().register("shopper@example.com").await;

    let mut client = app.client();
    assert_eq!(
        client.get("/api/chat-history/").await.status,
        StatusCode::UNAUTHORIZED
    );

    let response = client
        .post_json(
            "/api/auth/login",
            &json!({"email": "shopper@example.com", "password": TEST_PASSWORD}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["user"]["email"], "shopper@example.com");
    assert_eq!(
        client.get("/api/chat-history/").await.status,
        StatusCode::OK
    );

    let response = client.send(axum::http::Method::POST, "/api/auth/logout", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"status": "success"}));
    assert_eq!(
        client.get("/api/chat-history/").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = app();
    app.client().register("shopper@example.com").await;

    for body in [
        json!({"email": "shopper@example.com", "password": "wrong-password"}),
        json!({"email": "nobody@example.com", "password": TEST_PASSWORD}),
    ] {
        let response = app.client().post_json("/api/auth/login", &body).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json(), json!({"error": "Invalid credentials"}));
    }
}
