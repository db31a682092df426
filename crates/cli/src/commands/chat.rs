//! Chat log listing.
//!
//! Columns: record ID, owner email, creation time, request preview.

use cartwise_core::Email;
use cartwise_server::db::PgChatLog;
use cartwise_server::models::{ChatRecordFilter, ChatRecordListing};

use super::{CommandError, connect};

/// Print chat records matching the filters, newest first.
///
/// # Errors
///
/// Returns an error if the email filter is invalid or the query fails.
pub async fn list(
    user: Option<&str>,
    search: Option<String>,
    limit: u32,
) -> Result<(), CommandError> {
    let user_email = user
        .map(Email::parse)
        .transpose()
        .map_err(|e| CommandError::InvalidEmail(e.to_string()))?;

    let filter = ChatRecordFilter {
        user_email,
        search,
        limit,
    };

    let pool = connect().await?;
    let listings = PgChatLog::new(pool).search(&filter).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:>8}  {:<32}  {:<19}  REQUEST", "ID", "USER", "CREATED");
        for listing in &listings {
            println!("{}", format_row(listing));
        }
    }

    tracing::info!("{} record(s)", listings.len());
    Ok(())
}

fn format_row(listing: &ChatRecordListing) -> String {
    let user = listing.user_email.as_ref().map_or("-", Email::as_str);
    format!(
        "{:>8}  {:<32}  {:<19}  {}",
        listing.record.id,
        user,
        listing.record.created_at.format("%Y-%m-%d %H:%M:%S"),
        listing.record.request_preview().replace('\n', " "),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use cartwise_core::{ChatRecordId, UserId};
    use cartwise_server::models::ChatRecord;

    use super::*;

    fn listing(request: &str, email: Option<&str>) -> ChatRecordListing {
        ChatRecordListing {
            record: ChatRecord {
                id: ChatRecordId::new(7),
                user_id: email.map(|_| UserId::new(1)),
                request_text: request.to_string(),
                response_text: "reply".to_string(),
                created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            },
            user_email: email.map(|e| Email::parse(e).unwrap()),
        }
    }

    #[test]
    fn test_format_row_shows_preview() {
        let long = "Where can I find running shoes that are good for flat feet and long distances?";
        let row = format_row(&listing(long, Some("shopper@example.com")));

        assert!(row.contains("shopper@example.com"));
        assert!(row.contains("2026-03-01 09:30:00"));
        assert!(row.ends_with("..."));
        assert!(!row.contains("long distances"));
    }

    #[test]
    fn test_format_row_without_owner() {
        let row = format_row(&listing("Hello", None));
        assert!(row.contains("  -  "));
        assert!(row.ends_with("Hello"));
    }
}
