//! User domain types.

use chrono::{DateTime, Utc};

use cartwise_core::{Email, UserId};

/// A registered shopper account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email (normalized).
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
