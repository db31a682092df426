//! Append-only chat log.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate builds
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use cartwise_core::{ChatRecordId, Email, UserId, UserMessage};

use super::{RepositoryError, escape_like};
use crate::models::chat::{ChatRecord, ChatRecordFilter, ChatRecordListing};

/// Storage for chatbot exchanges.
///
/// Records are immutable once appended; there is no update or delete.
#[async_trait]
pub trait ChatLog: Send + Sync {
    /// Append one exchange for an authenticated shopper.
    async fn append(
        &self,
        user_id: UserId,
        request: &UserMessage,
        response: &str,
    ) -> Result<ChatRecord, RepositoryError>;

    /// The shopper's most recent records, newest first, at most `limit`.
    async fn recent_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ChatRecord>, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ChatRecordRow {
    id: i64,
    user_id: Option<i64>,
    request_text: String,
    response_text: String,
    created_at: DateTime<Utc>,
}

impl From<ChatRecordRow> for ChatRecord {
    fn from(row: ChatRecordRow) -> Self {
        Self {
            id: ChatRecordId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            request_text: row.request_text,
            response_text: row.response_text,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChatRecordListingRow {
    id: i64,
    user_id: Option<i64>,
    user_email: Option<String>,
    request_text: String,
    response_text: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChatRecordListingRow> for ChatRecordListing {
    type Error = RepositoryError;

    fn try_from(row: ChatRecordListingRow) -> Result<Self, Self::Error> {
        let user_email = row
            .user_email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

        Ok(Self {
            record: ChatRecord {
                id: ChatRecordId::new(row.id),
                user_id: row.user_id.map(UserId::new),
                request_text: row.request_text,
                response_text: row.response_text,
                created_at: row.created_at,
            },
            user_email,
        })
    }
}

// =============================================================================
// PostgreSQL Store
// =============================================================================

/// `PostgreSQL`-backed chat log.
#[derive(Debug, Clone)]
pub struct PgChatLog {
    pool: PgPool,
}

impl PgChatLog {
    /// Create a chat log over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Operator listing across all shoppers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        filter: &ChatRecordFilter,
    ) -> Result<Vec<ChatRecordListing>, RepositoryError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let rows = sqlx::query_as::<_, ChatRecordListingRow>(
            r"
            SELECT c.id, c.user_id, u.email AS user_email,
                   c.request_text, c.response_text, c.created_at
            FROM cartwise.chat_record c
            LEFT JOIN cartwise.app_user u ON u.id = c.user_id
            WHERE ($1::text IS NULL OR u.email = $1)
              AND ($2::text IS NULL
                   OR c.request_text ILIKE $2
                   OR c.response_text ILIKE $2
                   OR u.email ILIKE $2)
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $3
            ",
        )
        .bind(filter.user_email.as_ref().map(Email::as_str))
        .bind(search)
        .bind(i64::from(filter.limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl ChatLog for PgChatLog {
    #[instrument(skip(self, request, response), fields(user_id = %user_id))]
    async fn append(
        &self,
        user_id: UserId,
        request: &UserMessage,
        response: &str,
    ) -> Result<ChatRecord, RepositoryError> {
        let row = sqlx::query_as::<_, ChatRecordRow>(
            r"
            INSERT INTO cartwise.chat_record (user_id, request_text, response_text)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, request_text, response_text, created_at
            ",
        )
        .bind(user_id)
        .bind(request.as_str())
        .bind(response)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn recent_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ChatRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, ChatRecordRow>(
            r"
            SELECT id, user_id, request_text, response_text, created_at
            FROM cartwise.chat_record
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
