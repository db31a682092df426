//! Account route handlers.
//!
//! JSON register, login, and logout backed by the session store.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use cartwise_core::{Email, UserId};

use crate::error::{ApiError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Register and login body.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: Email,
}

/// Register and login success body.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserSummary,
    pub status: &'static str,
}

/// Logout success body.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl AuthResponse {
    fn for_user(user: User) -> Self {
        Self {
            user: UserSummary {
                id: user.id,
                email: user.email,
            },
            status: "success",
        }
    }
}

fn credentials(
    body: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest> {
    body.map(|Json(credentials)| credentials)
        .map_err(|_| ApiError::Validation("Email and password are required".to_string()))
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Create an account and sign it in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let form = credentials(body)?;

    let user = AuthService::new(state.accounts())
        .register(&form.email, &form.password)
        .await?;
    start_session(&session, &user).await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::for_user(user))))
}

/// Sign in with email and password.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let form = credentials(body)?;

    let user = AuthService::new(state.accounts())
        .login(&form.email, &form.password)
        .await?;
    start_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "shopper logged in");
    Ok(Json(AuthResponse::for_user(user)))
}

/// Sign out and discard the session.
pub async fn logout(session: Session) -> Result<Json<StatusResponse>> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(Json(StatusResponse { status: "success" }))
}
