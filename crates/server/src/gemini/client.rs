//! Gemini API client for text generation.
//!
//! Non-streaming access to the `generateContent` endpoint. Every request is
//! bounded by the configured timeout and is attempted exactly once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::config::GeminiConfig;
use crate::gateway::TextGenerator;

use super::error::{ApiErrorResponse, GeminiError};
use super::types::{GenerateContentRequest, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Gemini API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.inner.endpoint)
            .field("model", &self.inner.model)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Gemini API key
    /// * `config` - Model, base URL and timeout settings
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::Configuration` if the API key is not a valid
    /// header value or the HTTP client cannot be built.
    pub fn new(api_key: &SecretString, config: &GeminiConfig) -> Result<Self, GeminiError> {
        let mut key_header = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|_| GeminiError::Configuration("API key contains invalid characters".into()))?;
        key_header.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, key_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeminiError::Configuration(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                endpoint: endpoint_url(&config.api_base, &config.model),
                model: config.model.clone(),
                timeout: config.timeout,
            }),
        })
    }

    /// Generate content for a single-turn prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, or the API returns
    /// an error response.
    #[instrument(skip(self, prompt), fields(model = %self.inner.model, prompt_len = prompt.len()))]
    pub async fn generate_content(
        &self,
        prompt: &str,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let request = GenerateContentRequest::from_prompt(prompt, DEFAULT_MAX_OUTPUT_TOKENS);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GeminiError::Parse(format!("Failed to parse response: {e}")))?;

        tracing::debug!(
            candidates = parsed.candidates.len(),
            finish_reason = ?parsed.candidates.first().and_then(|c| c.finish_reason.as_deref()),
            model_version = ?parsed.model_version,
            "Gemini response received"
        );

        Ok(parsed)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> GeminiError {
        if error.is_timeout() {
            GeminiError::Timeout(self.inner.timeout.as_secs())
        } else {
            GeminiError::Http(error)
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError> {
        Ok(self.generate_content(prompt).await?.text())
    }
}

/// Build the `generateContent` URL for a model.
fn endpoint_url(api_base: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        api_base.trim_end_matches('/'),
        model
    )
}

/// Convert a non-success response into a `GeminiError`.
async fn handle_error_status(
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> GeminiError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return GeminiError::RateLimited(retry_after);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return GeminiError::Unauthorized("API key rejected".to_string());
    }

    match response.text().await {
        Ok(body) => parse_error_body(status, &body),
        Err(e) => GeminiError::Http(e),
    }
}

/// Interpret an error body, falling back to the raw text.
fn parse_error_body(status: reqwest::StatusCode, body: &str) -> GeminiError {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_error) => GeminiError::Api {
            status: if api_error.error.status.is_empty() {
                status.to_string()
            } else {
                api_error.error.status
            },
            message: api_error.error.message,
        },
        Err(_) => GeminiError::Api {
            status: status.to_string(),
            message: body.to_string(),
        },
    }
}
