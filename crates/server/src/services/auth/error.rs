//! Shopper account errors.

use thiserror::Error;

use crate::db::RepositoryError;

/// Why a registration or login attempt failed.
///
/// `InvalidCredentials` deliberately covers both an unknown email and a wrong
/// password.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email could not be parsed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] cartwise_core::EmailError),

    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email is already registered.
    #[error("account already registered")]
    UserAlreadyExists,

    /// The password does not satisfy the length rule.
    #[error("password rejected: {0}")]
    WeakPassword(String),

    /// The account store failed.
    #[error("account store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Argon2 could not hash the password.
    #[error("password hashing failed")]
    PasswordHash,
}
