//! Validated chat input.

use core::fmt;

use serde::Serialize;

/// Errors that can occur when parsing a [`UserMessage`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// Nothing but whitespace was supplied.
    #[error("Message is required")]
    Empty,
}

/// Text a shopper sent to the assistant, trimmed and guaranteed non-empty.
///
/// This is the only way to obtain request text for a chat record, so an
/// empty request can never reach the chat log.
///
/// ```
/// use cartwise_core::UserMessage;
///
/// let message = UserMessage::parse("  Do you ship to Canada?\n").unwrap();
/// assert_eq!(message.as_str(), "Do you ship to Canada?");
///
/// assert!(UserMessage::parse(" \t ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserMessage(String);

impl UserMessage {
    /// Trim `input` and reject it if nothing remains.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Empty`] for empty or whitespace-only input.
    pub fn parse(input: &str) -> Result<Self, MessageError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MessageError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the message as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the message and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
