//! Authentication extractors.
//!
//! Reads the session-stored [`CurrentUser`] set at login.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires an authenticated shopper.
///
/// Rejects with `401 {"error":"Authentication required"}` before the handler
/// runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection returned by [`RequireAuth`].
#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "Authentication required"})),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state)
            .await
            .map_err(|never| match never {})?;

        user.map(Self).ok_or(AuthRejection)
    }
}

/// Extractor that optionally gets the current shopper.
///
/// Anonymous callers (or requests without a session layer) yield `None`.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Read the signed-in shopper from the session.
///
/// A session store failure is logged and treated as anonymous.
async fn current_user(session: &Session) -> Option<CurrentUser> {
    match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read session, treating caller as anonymous");
            None
        }
    }
}

/// Store the logged-in shopper in the session.
///
/// The session ID is cycled first to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Clear the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::session_store;
    use tower_sessions::{MemoryStore, SessionStore};

    use cartwise_core::{Email, UserId};

    use super::*;

    /// A session backend that is unreachable.
    #[derive(Debug, Clone)]
    struct UnreachableStore;

    #[async_trait]
    impl SessionStore for UnreachableStore {
        async fn save(&self, _record: &Record) -> session_store::Result<()> {
            Err(session_store::Error::Backend("connection refused".to_string()))
        }

        async fn load(&self, _session_id: &Id) -> session_store::Result<Option<Record>> {
            Err(session_store::Error::Backend("connection refused".to_string()))
        }

        async fn delete(&self, _session_id: &Id) -> session_store::Result<()> {
            Err(session_store::Error::Backend("connection refused".to_string()))
        }
    }

    fn shopper() -> CurrentUser {
        CurrentUser {
            id: UserId::new(4),
            email: Email::parse("shopper@example.com").expect("email"),
        }
    }

    #[tokio::test]
    async fn test_current_user_reads_signed_in_shopper() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session
            .insert(session_keys::CURRENT_USER, shopper())
            .await
            .expect("insert");

        assert_eq!(current_user(&session).await, Some(shopper()));
    }

    #[tokio::test]
    async fn test_current_user_absent_for_fresh_session() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert_eq!(current_user(&session).await, None);
    }

    #[tokio::test]
    async fn test_current_user_store_failure_is_anonymous() {
        let session = Session::new(Some(Id::default()), Arc::new(UnreachableStore), None);
        assert_eq!(current_user(&session).await, None);
    }
}
