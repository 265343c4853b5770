//! GitHub OAuth code exchange and login orchestration.
//!
//! The exchange swaps an authorisation code for a delegated access token,
//! fetches the associated GitHub profile, upserts the identity store, and
//! mints a session credential. Each upstream call is made exactly once; a
//! failure is surfaced to the caller rather than retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::github::AccessToken;
use crate::persistence::{Identity, IdentityStore, IdentityWrite};

use super::credential::{CredentialSigner, SessionCredential};
use super::error::AuthError;

const DEFAULT_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const DEFAULT_USER_PROFILE_URL: &str = "https://api.github.com/user";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const USER_AGENT: &str = concat!("testsmith/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`GitHubOAuthClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    /// OAuth application client id.
    pub client_id: String,
    /// OAuth application client secret.
    pub client_secret: String,
    /// Token exchange endpoint.
    pub token_url: String,
    /// Profile endpoint queried with the delegated token.
    pub user_profile_url: String,
    /// HTTP timeout for both provider calls.
    pub timeout: Duration,
}

impl OAuthConfig {
    /// Constructs configuration for the public GitHub endpoints.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: DEFAULT_TOKEN_URL.to_owned(),
            user_profile_url: DEFAULT_USER_PROFILE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Overrides both provider endpoints, primarily for tests.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        user_profile_url: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.user_profile_url = user_profile_url.into();
        self
    }
}

/// External profile fields consumed by the login flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubProfile {
    /// Numeric GitHub account id.
    pub id: u64,
    /// GitHub login name.
    pub login: String,
}

/// Exchange operations against the OAuth provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthExchange: Send + Sync {
    /// Exchanges an authorisation code for a delegated access token.
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, AuthError>;

    /// Fetches the external profile associated with a delegated token.
    async fn fetch_profile(&self, token: &AccessToken) -> Result<GitHubProfile, AuthError>;
}

/// Reqwest-backed exchange against GitHub's OAuth endpoints.
#[derive(Debug, Clone)]
pub struct GitHubOAuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl GitHubOAuthClient {
    /// Creates a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: OAuthConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|error| AuthError::Configuration {
                message: format!("failed to configure OAuth HTTP client: {error}"),
            })?;

        Ok(Self { config, http })
    }
}

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

#[async_trait]
impl OAuthExchange for GitHubOAuthClient {
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, AuthError> {
        let payload = TokenExchangeRequest {
            client_id: self.config.client_id.as_str(),
            client_secret: self.config.client_secret.as_str(),
            code,
        };

        let response = self
            .http
            .post(&self.config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|error| AuthError::CodeExchangeFailed {
                message: format!("token request transport failed: {error}"),
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            return Err(AuthError::CodeExchangeFailed {
                message: format!("provider returned status {}", status.as_u16()),
            });
        }

        let token_response: TokenExchangeResponse =
            response
                .json()
                .await
                .map_err(|error| AuthError::CodeExchangeFailed {
                    message: format!("token response decoding failed: {error}"),
                })?;

        let Some(access_token) = token_response.access_token else {
            let detail = token_response
                .error_description
                .or(token_response.error)
                .unwrap_or_else(|| "provider returned no access token".to_owned());
            return Err(AuthError::CodeExchangeFailed { message: detail });
        };

        AccessToken::new(access_token).map_err(|error| AuthError::CodeExchangeFailed {
            message: format!("provider returned an unusable token: {error}"),
        })
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<GitHubProfile, AuthError> {
        let response = self
            .http
            .get(&self.config.user_profile_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("token {}", token.value()),
            )
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(|error| AuthError::ProfileFetchFailed {
                message: format!("profile request transport failed: {error}"),
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            return Err(AuthError::ProfileFetchFailed {
                message: format!("provider returned status {}", status.as_u16()),
            });
        }

        response
            .json()
            .await
            .map_err(|error| AuthError::ProfileFetchFailed {
                message: format!("profile response decoding failed: {error}"),
            })
    }
}

/// Completes a login: exchanges the code, upserts the identity, and mints a
/// session credential bound to the identity's internal id.
///
/// # Errors
///
/// Propagates [`AuthError::CodeExchangeFailed`],
/// [`AuthError::ProfileFetchFailed`], [`AuthError::Store`], and
/// [`AuthError::MintFailed`] from the respective stages.
pub async fn login_with_code(
    exchange: &dyn OAuthExchange,
    identities: &IdentityStore,
    signer: &CredentialSigner,
    code: &str,
) -> Result<SessionCredential, AuthError> {
    let access_token = exchange.exchange_code(code).await?;
    let profile = exchange.fetch_profile(&access_token).await?;

    let identity = upsert_identity(identities, &profile, &access_token)?;

    tracing::info!(login = %identity.login, "OAuth login completed");

    signer.sign(identity.id)
}

fn upsert_identity(
    identities: &IdentityStore,
    profile: &GitHubProfile,
    access_token: &AccessToken,
) -> Result<Identity, AuthError> {
    let github_id = profile.id.to_string();
    identities
        .upsert(IdentityWrite {
            github_id: github_id.as_str(),
            login: profile.login.as_str(),
            access_token: access_token.value(),
        })
        .map_err(|error| AuthError::Store {
            message: error.to_string(),
        })
}
