//! AI gateway for the shopping assistant.
//!
//! Turns customer text into generated text using a hosted model. Two modes
//! are supported:
//!
//! - [`GenerationMode::Conversational`] - the prompt is prefixed with the
//!   store persona and the raw reply is returned (never empty).
//! - [`GenerationMode::Suggestion`] - the model is asked for product
//!   suggestions as JSON and the reply is decoded best-effort, so callers
//!   always receive a well-formed list.
//!
//! The gateway is built once at startup. Without an API key it is
//! *unconfigured* for the lifetime of the process and every call fails with
//! [`GatewayError::NotConfigured`]. Each call makes exactly one upstream
//! attempt; there is no retry and no caching.

pub mod decode;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::GeminiConfig;
use crate::gemini::{GeminiClient, GeminiError};

pub use decode::{decode_suggestions, fallback_suggestion};
pub use prompts::FALLBACK_REPLY;

/// A backend able to complete a text prompt.
///
/// Implemented by [`GeminiClient`]; tests substitute scripted generators.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt`. An empty string is a valid reply.
    async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError>;
}

/// How the gateway should shape a prompt and interpret the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Free-form persona-constrained reply.
    Conversational,
    /// Structured list of product suggestions.
    Suggestion,
}

/// One AI-proposed product for a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSuggestion {
    /// Product name.
    pub name: String,
    /// Short description.
    pub description: String,
}

/// Result of a gateway call, shaped by its [`GenerationMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutput {
    /// Conversational reply text (never empty).
    Text(String),
    /// Decoded suggestions (always well-formed).
    Suggestions(Vec<ProductSuggestion>),
}

/// Errors surfaced by the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No API key was configured at startup.
    #[error("Gemini API key not configured")]
    NotConfigured,

    /// The upstream call failed.
    #[error("{0}")]
    Upstream(#[from] GeminiError),
}

/// Gateway to the hosted generative model.
#[derive(Clone)]
pub struct AiGateway {
    backend: Option<Arc<dyn TextGenerator>>,
}

impl std::fmt::Debug for AiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiGateway")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl AiGateway {
    /// Build the gateway from configuration.
    ///
    /// An absent API key yields an unconfigured gateway.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::Configuration` if a key is present but the HTTP
    /// client cannot be built from it.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, GeminiError> {
        match &config.api_key {
            Some(key) => {
                let client = GeminiClient::new(key, config)?;
                Ok(Self::with_backend(Arc::new(client)))
            }
            None => Ok(Self::unconfigured()),
        }
    }

    /// Build a gateway over an arbitrary backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn TextGenerator>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Build a gateway that rejects every call as not configured.
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self { backend: None }
    }

    /// Whether the gateway has a backend.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Generate output for `prompt` in the given mode.
    ///
    /// In [`GenerationMode::Suggestion`] mode `prompt` is the shopper's search
    /// query; the structured instructions are added here.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotConfigured` without making a call when no
    /// backend exists, or `GatewayError::Upstream` if the call fails.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate(
        &self,
        prompt: &str,
        mode: GenerationMode,
    ) -> Result<GatewayOutput, GatewayError> {
        let backend = self.backend()?;

        match mode {
            GenerationMode::Conversational => converse_with(backend, prompt)
                .await
                .map(GatewayOutput::Text),
            GenerationMode::Suggestion => suggest_with(backend, prompt)
                .await
                .map(GatewayOutput::Suggestions),
        }
    }

    /// Conversational reply for a customer message.
    ///
    /// # Errors
    ///
    /// See [`AiGateway::generate`].
    #[instrument(skip(self, message), fields(prompt_len = message.len()))]
    pub async fn converse(&self, message: &str) -> Result<String, GatewayError> {
        converse_with(self.backend()?, message).await
    }

    /// Product suggestions for a search query.
    ///
    /// # Errors
    ///
    /// See [`AiGateway::generate`].
    #[instrument(skip(self, query), fields(prompt_len = query.len()))]
    pub async fn suggest(&self, query: &str) -> Result<Vec<ProductSuggestion>, GatewayError> {
        suggest_with(self.backend()?, query).await
    }

    fn backend(&self) -> Result<&dyn TextGenerator, GatewayError> {
        self.backend.as_deref().ok_or(GatewayError::NotConfigured)
    }
}

async fn converse_with(
    backend: &dyn TextGenerator,
    message: &str,
) -> Result<String, GatewayError> {
    let reply = backend
        .generate_text(&prompts::conversational_prompt(message))
        .await?;

    if reply.trim().is_empty() {
        tracing::warn!("model returned empty reply, using fallback");
        return Ok(FALLBACK_REPLY.to_string());
    }

    Ok(reply)
}

async fn suggest_with(
    backend: &dyn TextGenerator,
    query: &str,
) -> Result<Vec<ProductSuggestion>, GatewayError> {
    let raw = backend
        .generate_text(&prompts::suggestion_prompt(query))
        .await?;

    Ok(decode_suggestions(&raw, query))
}
