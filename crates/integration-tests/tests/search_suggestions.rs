//! Integration tests for `GET /api/search-suggestions/`.

use axum::http::StatusCode;
use serde_json::json;

use cartwise_integration_tests::{ScriptedGenerator, TestApp};

const FIVE_SUGGESTIONS: &str = r#"[
  {"name": "Trail Runner 2", "description": "Lightweight trail shoe"},
  {"name": "Road Glide", "description": "Cushioned road shoe"},
  {"name": "Tempo Racer", "description": "Carbon-plated racer"},
  {"name": "Daily Trainer", "description": "Everyday mileage"},
  {"name": "Stability Pro", "description": "Support for overpronation"}
]"#;

#[tokio::test]
async fn test_empty_query_returns_empty_list_without_calling_model() {
    let generator = ScriptedGenerator::replying(FIVE_SUGGESTIONS);
    let app = TestApp::new(generator.clone());
    let mut client = app.client();

    for uri in [
        "/api/search-suggestions/?q=",
        "/api/search-suggestions/",
        "/api/search-suggestions/?q=%20%20",
    ] {
        let response = client.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
        assert_eq!(
            response.json(),
            json!({"query": "", "suggestions": [], "status": "success"})
        );
    }

    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_unreadable_query_string_is_treated_as_empty() {
    let generator = ScriptedGenerator::replying(FIVE_SUGGESTIONS);
    let app = TestApp::new(generator.clone());
    let mut client = app.client();

    let response = client.get("/api/search-suggestions/?q=lamp&q=desk").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"query": "", "suggestions": [], "status": "success"})
    );
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_empty_query_succeeds_even_when_unconfigured() {
    let app = TestApp::unconfigured();
    let mut client = app.client();

    let response = client.get("/api/search-suggestions/?q=").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["suggestions"], json!([]));
}

#[tokio::test]
async fn test_valid_json_reply_is_returned_verbatim() {
    let generator = ScriptedGenerator::replying(FIVE_SUGGESTIONS);
    let app = TestApp::new(generator.clone());
    let mut client = app.client();

    let response = client
        .get("/api/search-suggestions/?q=running%20shoes")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["query"], "running shoes");
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["suggestions"],
        serde_json::from_str::<serde_json::Value>(FIVE_SUGGESTIONS).expect("fixture")
    );
    assert!(generator.prompts()[0].contains("running shoes"));
}

#[tokio::test]
async fn test_fenced_json_reply_is_decoded() {
    let fenced = format!("```json\n{FIVE_SUGGESTIONS}\n```");
    let app = TestApp::new(ScriptedGenerator::replying(&fenced));
    let mut client = app.client();

    let response = client.get("/api/search-suggestions?q=shoes").await;

    assert_eq!(response.status, StatusCode::OK);
    let suggestions = response.json()["suggestions"].clone();
    assert_eq!(suggestions.as_array().map(Vec::len), Some(5));
    assert_eq!(suggestions[0]["name"], "Trail Runner 2");
}

#[tokio::test]
async fn test_prose_reply_falls_back_to_single_suggestion() {
    let app = TestApp::new(ScriptedGenerator::replying(
        "Sure! Here are some great blenders you might like.",
    ));
    let mut client = app.client();

    let response = client.get("/api/search-suggestions/?q=blender").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({
            "query": "blender",
            "suggestions": [{"name": "blender", "description": "Search for: blender"}],
            "status": "success",
        })
    );
}

#[tokio::test]
async fn test_unconfigured_gateway_keeps_suggestions_field() {
    let app = TestApp::unconfigured();
    let mut client = app.client();

    let response = client.get("/api/search-suggestions/?q=lamp").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({"error": "Gemini API key not configured", "suggestions": []})
    );
}

#[tokio::test]
async fn test_upstream_failure_keeps_suggestions_field() {
    let app = TestApp::new(ScriptedGenerator::failing("quota exceeded"));
    let mut client = app.client();

    let response = client.get("/api/search-suggestions/?q=lamp").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert!(
        body["error"]
            .as_str()
            .expect("error string")
            .contains("quota exceeded")
    );
    assert_eq!(body["suggestions"], json!([]));
}
