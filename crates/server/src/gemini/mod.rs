//! Google Gemini API integration.
//!
//! Provides a non-streaming client for the `generateContent` endpoint. The
//! client is one [`TextGenerator`](crate::gateway::TextGenerator) backend for
//! the AI gateway; it knows nothing about personas or suggestion formats.

mod client;
mod error;
mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use types::GenerateContentResponse;
