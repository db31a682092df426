//! In-process stores.
//!
//! Same contracts as the `PostgreSQL` stores, backed by a `Mutex`. Used by
//! handler tests that run without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use cartwise_core::{ChatRecordId, Email, UserId, UserMessage};

use super::{AccountStore, ChatLog, RepositoryError};
use crate::models::chat::ChatRecord;
use crate::models::user::User;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::DataCorruption("in-memory store lock poisoned".to_string()))
}

// =============================================================================
// Chat Log
// =============================================================================

/// In-memory chat log.
#[derive(Debug, Clone, Default)]
pub struct MemoryChatLog {
    records: Arc<Mutex<Vec<ChatRecord>>>,
}

impl MemoryChatLog {
    /// Create an empty chat log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the lock is poisoned.
    pub fn all(&self) -> Result<Vec<ChatRecord>, RepositoryError> {
        Ok(lock(&self.records)?.clone())
    }
}

#[async_trait]
impl ChatLog for MemoryChatLog {
    async fn append(
        &self,
        user_id: UserId,
        request: &UserMessage,
        response: &str,
    ) -> Result<ChatRecord, RepositoryError> {
        let mut records = lock(&self.records)?;
        let next_id = i64::try_from(records.len())
            .map_err(|_| RepositoryError::DataCorruption("chat log full".to_string()))?
            + 1;

        let record = ChatRecord {
            id: ChatRecordId::new(next_id),
            user_id: Some(user_id),
            request_text: request.as_str().to_string(),
            response_text: response.to_string(),
            created_at: Utc::now(),
        };
        records.push(record.clone());

        Ok(record)
    }

    async fn recent_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ChatRecord>, RepositoryError> {
        let records = lock(&self.records)?;
        let mut owned: Vec<ChatRecord> = records
            .iter()
            .filter(|r| r.user_id == Some(user_id))
            .cloned()
            .collect();

        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_i64().cmp(&a.id.as_i64()))
        });
        owned.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(owned)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        lock(&self.records).map(|_| ())
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Default)]
struct AccountTable {
    users: Vec<User>,
    password_hashes: HashMap<UserId, String>,
}

/// In-memory account store.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    table: Arc<Mutex<AccountTable>>,
}

impl MemoryAccountStore {
    /// Create an empty account store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut table = lock(&self.table)?;

        if table.users.iter().any(|u| &u.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let next_id = i64::try_from(table.users.len())
            .map_err(|_| RepositoryError::DataCorruption("account table full".to_string()))?
            + 1;
        let user = User {
            id: UserId::new(next_id),
            email: email.clone(),
            created_at: Utc::now(),
        };

        table.password_hashes.insert(user.id, password_hash.to_string());
        table.users.push(user.clone());

        Ok(user)
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let table = lock(&self.table)?;

        Ok(table
            .users
            .iter()
            .find(|u| &u.email == email)
            .and_then(|user| {
                table
                    .password_hashes
                    .get(&user.id)
                    .map(|hash| (user.clone(), hash.clone()))
            }))
    }
}
