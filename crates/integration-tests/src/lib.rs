//! Integration test harness for Cartwise.
//!
//! Builds the real router with in-memory stores, an in-memory session store,
//! and a scripted text generator, then drives it with
//! `tower::ServiceExt::oneshot`. No network or database is needed except for
//! the `#[ignore]`d `PostgreSQL` tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartwise-integration-tests
//!
//! # Include PostgreSQL tests
//! DATABASE_URL=postgres://localhost/cartwise_test \
//!     cargo test -p cartwise-integration-tests -- --ignored
//! ```

#![allow(clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;
use tower_sessions::MemoryStore;

use cartwise_core::{UserId, UserMessage};
use cartwise_server::db::{ChatLog, MemoryAccountStore, MemoryChatLog, RepositoryError};
use cartwise_server::gateway::{AiGateway, TextGenerator};
use cartwise_server::gemini::GeminiError;
use cartwise_server::middleware::create_session_layer;
use cartwise_server::models::ChatRecord;
use cartwise_server::state::AppState;

/// Password used by [`TestClient::register`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

// =============================================================================
// Scripted Generator
// =============================================================================

/// A [`TextGenerator`] that returns a fixed reply and records every prompt.
pub struct ScriptedGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// Always reply with `text`.
    #[must_use]
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Always fail with an upstream API error carrying `message`.
    #[must_use]
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Prompts received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt lock").clone()
    }

    /// Number of upstream calls made.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.prompts.lock().expect("prompt lock").len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError> {
        self.prompts
            .lock()
            .expect("prompt lock")
            .push(prompt.to_string());

        self.reply.clone().map_err(|message| GeminiError::Api {
            status: "UNAVAILABLE".to_string(),
            message,
        })
    }
}

// =============================================================================
// Failing Chat Log
// =============================================================================

/// A chat log whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingChatLog;

#[async_trait]
impl ChatLog for FailingChatLog {
    async fn append(
        &self,
        _user_id: UserId,
        _request: &UserMessage,
        _response: &str,
    ) -> Result<ChatRecord, RepositoryError> {
        Err(RepositoryError::DataCorruption("disk full".to_string()))
    }

    async fn recent_for_user(
        &self,
        _user_id: UserId,
        _limit: u32,
    ) -> Result<Vec<ChatRecord>, RepositoryError> {
        Err(RepositoryError::DataCorruption("disk full".to_string()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(RepositoryError::DataCorruption("disk full".to_string()))
    }
}

// =============================================================================
// Test Application
// =============================================================================

/// The application under test plus handles to its collaborators.
pub struct TestApp {
    app: NormalizePath<Router>,
    /// In-memory chat log, `None` when a custom chat log was supplied.
    pub chat_log: Option<MemoryChatLog>,
}

impl TestApp {
    /// App with a configured gateway over `generator` and an in-memory chat log.
    #[must_use]
    pub fn new(generator: Arc<ScriptedGenerator>) -> Self {
        let chat_log = MemoryChatLog::new();
        let app = build(
            AiGateway::with_backend(generator),
            Arc::new(chat_log.clone()),
        );
        Self {
            app,
            chat_log: Some(chat_log),
        }
    }

    /// App whose gateway has no API key.
    #[must_use]
    pub fn unconfigured() -> Self {
        let chat_log = MemoryChatLog::new();
        let app = build(AiGateway::unconfigured(), Arc::new(chat_log.clone()));
        Self {
            app,
            chat_log: Some(chat_log),
        }
    }

    /// App with a configured gateway and a caller-supplied chat log.
    #[must_use]
    pub fn with_chat_log(generator: Arc<ScriptedGenerator>, chat_log: Arc<dyn ChatLog>) -> Self {
        Self {
            app: build(AiGateway::with_backend(generator), chat_log),
            chat_log: None,
        }
    }

    /// A new client with its own cookie jar.
    #[must_use]
    pub fn client(&self) -> TestClient {
        TestClient {
            app: self.app.clone(),
            cookie: None,
        }
    }

    /// The assembled application, for serving over a real socket.
    #[must_use]
    pub fn service(&self) -> NormalizePath<Router> {
        self.app.clone()
    }

    /// Every record in the in-memory chat log.
    #[must_use]
    pub fn records(&self) -> Vec<ChatRecord> {
        self.chat_log
            .as_ref()
            .expect("app built with an in-memory chat log")
            .all()
            .expect("chat log readable")
    }
}

fn build(gateway: AiGateway, chat_log: Arc<dyn ChatLog>) -> NormalizePath<Router> {
    let state = AppState::new(
        gateway,
        chat_log,
        Arc::new(MemoryAccountStore::new()),
    );
    cartwise_server::app(state, create_session_layer(MemoryStore::default(), false))
}

// =============================================================================
// Test Client
// =============================================================================

/// A response with its body fully read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    /// The body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("response body is UTF-8")
    }
}

/// Sends requests to a [`TestApp`], carrying the session cookie between calls.
pub struct TestClient {
    app: NormalizePath<Router>,
    cookie: Option<String>,
}

impl TestClient {
    /// Send a request with an optional body and content type.
    pub async fn send(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<(&str, Vec<u8>)>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some((content_type, bytes)) => builder
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(bytes)),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("infallible service");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            self.cookie = set_cookie.split(';').next().map(str::to_string);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("readable body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET uri`.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    /// `POST uri` with a JSON body.
    pub async fn post_json(&mut self, uri: &str, body: &Value) -> TestResponse {
        let bytes = serde_json::to_vec(body).expect("serializable body");
        self.send(Method::POST, uri, Some(("application/json", bytes)))
            .await
    }

    /// `POST uri` with raw bytes and a content type.
    pub async fn post_raw(&mut self, uri: &str, content_type: &str, body: &[u8]) -> TestResponse {
        self.send(Method::POST, uri, Some((content_type, body.to_vec())))
            .await
    }

    /// Register `email` with [`TEST_PASSWORD`], leaving this client signed in.
    pub async fn register(&mut self, email: &str) -> TestResponse {
        let response = self
            .post_json(
                "/api/auth/register",
                &serde_json::json!({"email": email, "password": TEST_PASSWORD}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "register {email}");
        response
    }

    /// Send a chatbot message and return the response.
    pub async fn chat(&mut self, message: &str) -> TestResponse {
        self.post_json("/api/chatbot/", &serde_json::json!({"message": message}))
            .await
    }
}
