//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Liveness check
//! GET  /health/ready             - Readiness check (chat log reachable)
//!
//! # Shopping assistant
//! POST /api/chatbot/             - Conversational reply
//! GET  /api/search-suggestions/  - AI product suggestions (?q=)
//! GET  /api/chat-history/        - Caller's 20 most recent exchanges (requires auth)
//!
//! # Accounts
//! POST /api/auth/register        - Create account and sign in
//! POST /api/auth/login           - Sign in
//! POST /api/auth/logout          - Sign out
//! ```
//!
//! Trailing slashes are trimmed before routing, so every path works with or
//! without one.

pub mod auth;
pub mod chatbot;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the account routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chatbot", post(chatbot::chatbot))
        .route("/search-suggestions", get(chatbot::search_suggestions))
        .route("/chat-history", get(chatbot::chat_history))
        .nest("/auth", auth_routes())
}

/// Build the complete router (without session or observability layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the chat log store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.chat_log().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
