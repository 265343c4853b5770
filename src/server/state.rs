//! Shared application state assembled once at startup.

use std::sync::Arc;

use crate::ai::{GeminiClient, GenerativeClient};
use crate::auth::{CredentialSigner, CredentialVerifier, GitHubOAuthClient, OAuthExchange};
use crate::config::TestsmithConfig;
use crate::persistence::IdentityStore;

use super::ServeError;

/// Dependencies shared by every request handler.
///
/// Constructed once from [`TestsmithConfig`]; the OAuth exchange and the
/// generative client sit behind trait objects so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    /// Front-end origin for post-login redirects and CORS.
    pub frontend_url: String,
    /// GitHub REST API base used for per-request gateways.
    pub github_api_base: String,
    /// Identity record store.
    pub identities: IdentityStore,
    /// Session credential signer.
    pub signer: CredentialSigner,
    /// The authenticated-request gate.
    pub verifier: CredentialVerifier,
    /// OAuth code exchange.
    pub oauth: Arc<dyn OAuthExchange>,
    /// Generative-text client.
    pub generative: Arc<dyn GenerativeClient>,
}

impl AppState {
    /// Assembles the state from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError`] when a required value is missing or a component
    /// cannot be constructed. A missing session signing secret fails here, at
    /// startup, rather than on first use.
    pub fn from_config(config: &TestsmithConfig) -> Result<Self, ServeError> {
        let database_url = config.require_database_url()?;
        let identities = IdentityStore::new(database_url)?;

        let signer = CredentialSigner::new(
            config.require_session_secret()?,
            config.session_ttl_seconds,
        )?;
        let verifier = CredentialVerifier::new(signer.clone(), identities.clone());

        let oauth: Arc<dyn OAuthExchange> =
            Arc::new(GitHubOAuthClient::new(config.oauth_config()?)?);
        let generative: Arc<dyn GenerativeClient> =
            Arc::new(GeminiClient::new(config.gemini_config())?);

        Ok(Self {
            frontend_url: config.frontend_url.trim_end_matches('/').to_owned(),
            github_api_base: config.github_api_base.clone(),
            identities,
            signer,
            verifier,
            oauth,
            generative,
        })
    }
}
