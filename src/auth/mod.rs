//! GitHub OAuth login, session credentials, and the authenticated-request
//! gate.
//!
//! The OAuth exchange swaps an authorisation code for a delegated access
//! token, provisions the identity store, and mints a stateless signed session
//! credential. Every privileged request then passes through the credential
//! verifier, which resolves the bearer credential back to a stored identity
//! without touching the OAuth provider.

pub mod credential;
pub mod error;
pub mod oauth;
pub mod verifier;

pub use credential::{CredentialClaims, CredentialSigner, SessionCredential};
pub use error::AuthError;
pub use oauth::{GitHubOAuthClient, GitHubProfile, OAuthConfig, OAuthExchange, login_with_code};
pub use verifier::{AuthenticatedIdentity, CredentialVerifier};

#[cfg(test)]
pub use oauth::MockOAuthExchange;
