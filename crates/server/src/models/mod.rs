//! Domain models for the shopping-assistant server.

pub mod chat;
pub mod session;
pub mod user;

pub use chat::{ChatRecord, ChatRecordFilter, ChatRecordListing};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
