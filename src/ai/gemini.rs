//! Gemini HTTP implementation of the generative-text client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::error::AiError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for [`GeminiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// Base API URL (e.g. `https://generativelanguage.googleapis.com/v1beta`).
    pub base_url: String,
    /// Model identifier addressed by `generateContent` requests.
    pub model: String,
    /// API key appended to each request.
    pub api_key: Option<String>,
    /// HTTP timeout; generous, matching the expected latency of a
    /// generative-model call.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeminiConfig {
    /// Constructs configuration with explicit API settings.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            timeout,
        }
    }
}

/// A client that can turn one prompt into one text completion.
///
/// Exactly one upstream call is made per invocation; there is no retry, no
/// backoff, and no timeout beyond the configured transport timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Generates text for a prompt.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] when the provider call fails or the response
    /// carries no generated text.
    async fn generate_text(&self, prompt: &str) -> Result<String, AiError>;
}

/// Reqwest-backed Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Creates a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Configuration`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| AiError::Configuration {
                message: format!("failed to configure AI HTTP client: {error}"),
            })?;

        Ok(Self { config, http })
    }

    fn extract_api_key(&self) -> Result<&str, AiError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(AiError::MissingApiKey)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn extract_candidate_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts?
        .into_iter()
        .find_map(|part| part.text)
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.extract_api_key()?;
        let payload = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|error| AiError::Network {
                message: error.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.map_or_else(
                |_| "(failed to read error response body)".to_owned(),
                |content| truncate_for_message(content.as_str(), 160),
            );
            return Err(AiError::Provider {
                message: format!("request failed with status {}: {body}", status.as_u16()),
            });
        }

        let response_payload: GenerateContentResponse =
            response.json().await.map_err(|error| AiError::Provider {
                message: format!("response JSON decoding failed: {error}"),
            })?;

        extract_candidate_text(response_payload)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AiError::Provider {
                message: "response did not contain generated text".to_owned(),
            })
    }
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output = String::new();
    let mut chars = message.chars();

    for _ in 0..max_chars {
        let Some(character) = chars.next() else {
            return output;
        };
        output.push(character);
    }

    if chars.next().is_some() {
        output.push_str("...");
    }

    output
}

#[cfg(test)]
#[path = "gemini_tests.rs"]
mod tests;
