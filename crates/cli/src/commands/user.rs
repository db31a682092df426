//! Shopper account commands.

use cartwise_server::db::PgAccountStore;
use cartwise_server::services::auth::AuthService;

use super::{CommandError, connect};

/// Create a shopper account with a password.
///
/// # Errors
///
/// Returns an error if the email or password is invalid, the email is taken,
/// or the database is unreachable.
pub async fn create(email: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let accounts = PgAccountStore::new(pool);

    let user = AuthService::new(&accounts).register(email, password).await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}
