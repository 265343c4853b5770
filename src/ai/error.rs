//! Error types for the AI orchestration layer.

use thiserror::Error;

/// Errors surfaced while invoking the generative-text provider.
///
/// Parsing failures are deliberately absent: malformed summary output is
/// recovered through the fallback path rather than surfaced as an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AiError {
    /// No API key was configured for the provider.
    #[error("AI API key is required (use --ai-api-key, TESTSMITH_AI_API_KEY, or GEMINI_API_KEY)")]
    MissingApiKey,

    /// The provider HTTP client could not be constructed.
    #[error("AI configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// The provider rejected the request or returned an unusable response.
    #[error("AI provider error: {message}")]
    Provider {
        /// Upstream response detail.
        message: String,
    },

    /// Networking failed while calling the provider.
    #[error("AI request transport failed: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },
}

impl AiError {
    /// Stable machine-readable code attached to HTTP error bodies.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingApiKey | Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Provider { .. } | Self::Network { .. } => "AI_PROVIDER_ERROR",
        }
    }
}
