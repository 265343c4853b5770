//! Error types for authentication and session handling.

use thiserror::Error;

/// Errors surfaced while authenticating requests or completing OAuth logins.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The request carried no `Authorization` header.
    #[error("authentication required")]
    MissingHeader,

    /// The `Authorization` header did not use the Bearer scheme.
    #[error("invalid authorization format")]
    MalformedHeader,

    /// The credential signature or payload was rejected.
    #[error("invalid token: {message}")]
    InvalidCredential {
        /// Verification failure detail.
        message: String,
    },

    /// The credential's embedded expiry has passed.
    #[error("token expired")]
    ExpiredCredential,

    /// The credential verified but references no stored identity.
    #[error("user account not found")]
    IdentityNotFound,

    /// No signing secret was configured.
    #[error("session signing secret is required (use --session-secret or TESTSMITH_SESSION_SECRET)")]
    MissingSigningSecret,

    /// Signing a new session credential failed.
    #[error("failed to mint session credential: {message}")]
    MintFailed {
        /// Error detail from the signing primitive.
        message: String,
    },

    /// The OAuth provider returned no delegated access token for the code.
    #[error("OAuth code exchange failed: {message}")]
    CodeExchangeFailed {
        /// Provider response detail.
        message: String,
    },

    /// Fetching the external profile for a delegated token failed.
    #[error("profile fetch failed: {message}")]
    ProfileFetchFailed {
        /// Provider response detail.
        message: String,
    },

    /// The identity store rejected a read or write.
    #[error("identity store error: {message}")]
    Store {
        /// Error detail from the persistence layer.
        message: String,
    },

    /// A client could not be constructed from the supplied configuration.
    #[error("authentication configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}

impl AuthError {
    /// Stable machine-readable code attached to HTTP error bodies.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "MISSING_AUTH_HEADER",
            Self::MalformedHeader => "INVALID_AUTH_FORMAT",
            Self::InvalidCredential { .. } => "INVALID_TOKEN",
            Self::ExpiredCredential => "TOKEN_EXPIRED",
            Self::IdentityNotFound => "USER_NOT_FOUND",
            Self::MissingSigningSecret | Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::MintFailed { .. } => "CREDENTIAL_MINT_FAILED",
            Self::CodeExchangeFailed { .. } => "CODE_EXCHANGE_FAILED",
            Self::ProfileFetchFailed { .. } => "PROFILE_FETCH_FAILED",
            Self::Store { .. } => "IDENTITY_STORE_ERROR",
        }
    }

    /// Whether the error belongs to the authentication-gate rejection class.
    ///
    /// Gate rejections map to HTTP 401 and are never retried; the remaining
    /// variants are upstream or configuration failures.
    #[must_use]
    pub const fn is_gate_rejection(&self) -> bool {
        matches!(
            self,
            Self::MissingHeader
                | Self::MalformedHeader
                | Self::InvalidCredential { .. }
                | Self::ExpiredCredential
                | Self::IdentityNotFound
        )
    }
}
