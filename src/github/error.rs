//! Error types exposed by the repository content gateway.

use thiserror::Error;

/// Errors surfaced while validating input or communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The delegated access token was missing or blank.
    #[error("delegated access token is required")]
    MissingToken,

    /// Repository owner or name was empty.
    #[error("repository owner and name are required")]
    MissingRepository,

    /// A URL could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// Listing the repository tree failed upstream.
    ///
    /// Covers every upstream failure of the tree walk (missing repository,
    /// bad branch, insufficient scope); the upstream detail is surfaced
    /// verbatim and the call is not retried.
    #[error("repository access failed: {message}")]
    RepoAccess {
        /// Upstream error detail.
        message: String,
    },

    /// Fetching one blob failed upstream or its content could not be decoded.
    #[error("file access failed: {message}")]
    FileAccess {
        /// Upstream error detail.
        message: String,
    },

    /// GitHub rejected the delegated token.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },
}

impl GatewayError {
    /// Stable machine-readable code attached to HTTP error bodies.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingToken | Self::Authentication { .. } => "GITHUB_AUTH_ERROR",
            Self::MissingRepository | Self::InvalidUrl(_) => "INVALID_REQUEST",
            Self::RepoAccess { .. } => "REPO_ACCESS_ERROR",
            Self::FileAccess { .. } => "FILE_ACCESS_ERROR",
            Self::Api { .. } | Self::Network { .. } => "GITHUB_API_ERROR",
        }
    }
}
