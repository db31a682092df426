//! `PostgreSQL` store tests.
//!
//! These tests require a reachable database in `DATABASE_URL`; migrations are
//! applied on connect.
//!
//! Run with: `cargo test -p cartwise-integration-tests -- --ignored`

use secrecy::SecretString;
use sqlx::PgPool;

use cartwise_core::{Email, UserMessage};
use cartwise_server::db::{self, AccountStore, ChatLog, PgAccountStore, PgChatLog, RepositoryError};
use cartwise_server::models::ChatRecordFilter;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("connect");
    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("migrate");
    pool
}

fn unique_email(prefix: &str) -> Email {
    Email::parse(&format!("{prefix}-{}@example.com", uuid::Uuid::new_v4())).expect("email")
}

fn message(text: &str) -> UserMessage {
    UserMessage::parse(text).expect("message")
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_append_and_recent_for_user() {
    let pool = pool().await;
    let accounts = PgAccountStore::new(pool.clone());
    let chat_log = PgChatLog::new(pool);

    let user = accounts
        .create_user(&unique_email("history"), "hash")
        .await
        .expect("user");
    let other = accounts
        .create_user(&unique_email("other"), "hash")
        .await
        .expect("user");

    for i in 0..3 {
        chat_log
            .append(user.id, &message(&format!("question {i}")), "answer")
            .await
            .expect("append");
    }
    chat_log
        .append(other.id, &message("not mine"), "answer")
        .await
        .expect("append");

    let records = chat_log.recent_for_user(user.id, 2).await.expect("recent");
    let texts: Vec<&str> = records.iter().map(|r| r.request_text.as_str()).collect();
    assert_eq!(texts, vec!["question 2", "question 1"]);
    assert!(records.iter().all(|r| r.user_id == Some(user.id)));

    chat_log.ping().await.expect("ping");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_email_is_conflict() {
    let pool = pool().await;
    let accounts = PgAccountStore::new(pool);
    let email = unique_email("dupe");

    accounts.create_user(&email, "hash").await.expect("first");
    let second = accounts.create_user(&email, "hash").await;

    assert!(matches!(second, Err(RepositoryError::Conflict(_))));

    let (user, hash) = accounts
        .find_credentials(&email)
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(user.email, email);
    assert_eq!(hash, "hash");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_search_filters_by_user_and_text() {
    let pool = pool().await;
    let accounts = PgAccountStore::new(pool.clone());
    let chat_log = PgChatLog::new(pool);

    let email = unique_email("search");
    let user = accounts.create_user(&email, "hash").await.expect("user");
    chat_log
        .append(user.id, &message("Is the 50% OFF sale still on?"), "Yes!")
        .await
        .expect("append");
    chat_log
        .append(user.id, &message("Where is my parcel?"), "On its way.")
        .await
        .expect("append");

    let by_user = chat_log
        .search(&ChatRecordFilter {
            user_email: Some(email.clone()),
            ..ChatRecordFilter::default()
        })
        .await
        .expect("search");
    assert_eq!(by_user.len(), 2);
    assert_eq!(by_user[0].record.request_text, "Where is my parcel?");
    assert_eq!(by_user[0].user_email.as_ref(), Some(&email));

    let by_text = chat_log
        .search(&ChatRecordFilter {
            user_email: Some(email.clone()),
            search: Some("50% off".to_string()),
            limit: 10,
        })
        .await
        .expect("search");
    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].record.response_text, "Yes!");

    let wildcard = chat_log
        .search(&ChatRecordFilter {
            user_email: Some(email),
            search: Some("%".to_string()),
            limit: 10,
        })
        .await
        .expect("search");
    assert_eq!(wildcard.len(), 1, "% matches literally");
}
