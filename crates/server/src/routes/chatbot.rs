//! Shopping-assistant API handlers.
//!
//! - `POST /api/chatbot/` - conversational reply, recorded for signed-in shoppers
//! - `GET /api/search-suggestions/?q=` - AI product suggestions for a query
//! - `GET /api/chat-history/` - the caller's recent exchanges

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cartwise_core::UserMessage;

use crate::db::ChatLog;
use crate::error::ApiError;
use crate::gateway::{GatewayError, ProductSuggestion};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{ChatRecord, CurrentUser};
use crate::state::AppState;

/// Number of records returned by the history endpoint.
pub const HISTORY_LIMIT: u32 = 20;

const STATUS_SUCCESS: &str = "success";
const CHATBOT_FAILURE_DETAILS: &str = "Failed to get response from AI";

// =============================================================================
// Request / Response Types
// =============================================================================

/// Chatbot request body.
#[derive(Debug, Default, Deserialize)]
pub struct ChatbotRequest {
    #[serde(default)]
    pub message: String,
}

/// Chatbot success body.
#[derive(Debug, Serialize)]
pub struct ChatbotResponse {
    pub user_message: String,
    pub bot_response: String,
    pub status: &'static str,
}

/// Suggestion query string.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

/// Suggestion success body.
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub query: String,
    pub suggestions: Vec<ProductSuggestion>,
    pub status: &'static str,
}

/// One history entry.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub user_message: String,
    pub bot_response: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatRecord> for HistoryEntry {
    fn from(record: ChatRecord) -> Self {
        Self {
            user_message: record.request_text,
            bot_response: record.response_text,
            created_at: record.created_at,
        }
    }
}

/// History success body.
#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<HistoryEntry>,
    pub status: &'static str,
}

// =============================================================================
// Endpoint Errors
// =============================================================================

/// Chatbot error: upstream and internal failures carry a `details` field.
#[derive(Debug)]
pub struct ChatbotError(ApiError);

impl From<ApiError> for ChatbotError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<GatewayError> for ChatbotError {
    fn from(err: GatewayError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ChatbotError {
    fn into_response(self) -> Response {
        match self.0 {
            err @ (ApiError::Upstream(_) | ApiError::Internal(_)) => err.into_json_response([(
                "details",
                Value::String(CHATBOT_FAILURE_DETAILS.to_string()),
            )]),
            err => err.into_response(),
        }
    }
}

/// Suggestion error: every failure carries an empty `suggestions` list.
#[derive(Debug)]
pub struct SuggestionError(ApiError);

impl From<GatewayError> for SuggestionError {
    fn from(err: GatewayError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for SuggestionError {
    fn into_response(self) -> Response {
        self.0
            .into_json_response([("suggestions", Value::Array(Vec::new()))])
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Answer a customer message.
///
/// The body is read as raw bytes so a missing content type or malformed JSON
/// is treated as an empty message rather than a framework rejection.
pub async fn chatbot(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    body: Bytes,
) -> Result<Json<ChatbotResponse>, ChatbotError> {
    let request: ChatbotRequest = serde_json::from_slice(&body).unwrap_or_default();
    let message = UserMessage::parse(&request.message)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let reply = state.gateway().converse(message.as_str()).await?;

    if let Some(user) = &user {
        record_exchange(state.chat_log(), user, &message, &reply).await;
    }

    Ok(Json(ChatbotResponse {
        user_message: message.into_inner(),
        bot_response: reply,
        status: STATUS_SUCCESS,
    }))
}

/// AI product suggestions for a search query.
pub async fn search_suggestions(
    State(state): State<AppState>,
    query: Result<Query<SuggestionQuery>, QueryRejection>,
) -> Result<Json<SuggestionsResponse>, SuggestionError> {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable search query, treating as empty");
            SuggestionQuery::default()
        }
    };
    let q = params.q.trim();

    if q.is_empty() {
        return Ok(Json(SuggestionsResponse {
            query: String::new(),
            suggestions: Vec::new(),
            status: STATUS_SUCCESS,
        }));
    }

    let suggestions = state.gateway().suggest(q).await?;

    Ok(Json(SuggestionsResponse {
        query: q.to_string(),
        suggestions,
        status: STATUS_SUCCESS,
    }))
}

/// The caller's most recent exchanges, newest first.
pub async fn chat_history(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    let records = state
        .chat_log()
        .recent_for_user(user.id, HISTORY_LIMIT)
        .await?;

    Ok(Json(ChatHistoryResponse {
        messages: records.into_iter().map(HistoryEntry::from).collect(),
        status: STATUS_SUCCESS,
    }))
}

/// Append the exchange to the chat log without failing the request.
async fn record_exchange(
    chat_log: &dyn ChatLog,
    user: &CurrentUser,
    message: &UserMessage,
    reply: &str,
) {
    if let Err(e) = chat_log.append(user.id, message, reply).await {
        let event_id = sentry::capture_error(&e);
        tracing::warn!(
            error = %e,
            user_id = %user.id,
            sentry_event_id = %event_id,
            "failed to record chat exchange"
        );
    }
}
