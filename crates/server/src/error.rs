//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, ApiError>` (or a thin wrapper that adds
//! endpoint-specific fields). Server errors are captured to Sentry before the
//! JSON body is written.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::gateway::GatewayError;
use crate::services::auth::AuthError;

/// API-level error type.
///
/// The `Display` output is the client-facing `error` message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request input failed validation.
    #[error("{0}")]
    Validation(String),

    /// The AI gateway has no API key.
    #[error("Gemini API key not configured")]
    NotConfigured,

    /// The upstream model call failed.
    #[error("{0}")]
    Upstream(String),

    /// Caller is not authenticated or presented bad credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotConfigured | Self::Upstream(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether this error is the server's fault.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    /// Build the JSON response, merging `extra` fields into the body.
    pub(crate) fn into_json_response(
        self,
        extra: impl IntoIterator<Item = (&'static str, Value)>,
    ) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(self.to_string()));
        for (key, value) in extra {
            body.insert(key.to_string(), value);
        }

        (self.status(), Json(Value::Object(body))).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_json_response([])
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotConfigured => Self::NotConfigured,
            GatewayError::Upstream(e) => Self::Upstream(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(_) => Self::Validation("Invalid email address".to_string()),
            AuthError::WeakPassword(msg) => Self::Validation(msg),
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::UserAlreadyExists => {
                Self::Conflict("An account with this email already exists".to_string())
            }
            AuthError::Repository(e) => Self::Internal(e.to_string()),
            AuthError::PasswordHash => Self::Internal("Internal server error".to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {err}"))
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
