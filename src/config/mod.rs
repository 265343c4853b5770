//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach. The struct is constructed
//! once at process start and passed explicitly into each component's
//! constructor, so no component performs hidden global lookups and every
//! component is independently testable with fake configuration.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.testsmith.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `TESTSMITH_*`, or legacy
//!    `GITHUB_CLIENT_ID` / `GITHUB_CLIENT_SECRET` / `GEMINI_API_KEY`
//! 4. **Command-line arguments** – e.g. `--bind-address`, `--database-url`

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::GeminiConfig;
use crate::auth::OAuthConfig;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Parsing arguments or loading configuration sources failed.
    #[error("configuration error: {message}")]
    Load {
        /// Details about the load failure.
        message: String,
    },

    /// A required value was absent from every source.
    #[error("{message}")]
    MissingValue {
        /// Which value is missing and how to supply it.
        message: String,
    },
}

const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:4000";
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_AI_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `TESTSMITH_GITHUB_CLIENT_ID` or legacy `GITHUB_CLIENT_ID`
/// - `TESTSMITH_GITHUB_CLIENT_SECRET` or legacy `GITHUB_CLIENT_SECRET`
/// - `TESTSMITH_SESSION_SECRET`: symmetric secret for session credentials
/// - `TESTSMITH_DATABASE_URL`: local `SQLite` database path
/// - `TESTSMITH_FRONTEND_URL`: origin receiving the post-login redirect
/// - `TESTSMITH_AI_API_KEY` or legacy `GEMINI_API_KEY`
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "TESTSMITH",
    discovery(
        dotfile_name = ".testsmith.toml",
        config_file_name = "testsmith.toml",
        app_name = "testsmith"
    )
)]
pub struct TestsmithConfig {
    /// OAuth application client id.
    #[ortho_config()]
    pub github_client_id: Option<String>,

    /// OAuth application client secret.
    #[ortho_config()]
    pub github_client_secret: Option<String>,

    /// Symmetric secret used to sign session credentials.
    ///
    /// A missing secret is the only fatal startup path in the core.
    #[ortho_config()]
    pub session_secret: Option<String>,

    /// Session credential lifetime in seconds. Defaults to seven days.
    #[ortho_config()]
    pub session_ttl_seconds: i64,

    /// Front-end origin that receives the post-login redirect and is allowed
    /// by CORS.
    #[ortho_config()]
    pub frontend_url: String,

    /// Address and port the HTTP server binds to.
    #[ortho_config()]
    pub bind_address: String,

    /// Local `SQLite` database URL/path used for identity persistence.
    ///
    /// Diesel uses a filesystem path for `SQLite` connections.
    #[ortho_config()]
    pub database_url: Option<String>,

    /// GitHub REST API base URL. Override for GitHub Enterprise hosts or
    /// tests.
    #[ortho_config()]
    pub github_api_base: String,

    /// OAuth token exchange endpoint override, primarily for tests.
    #[ortho_config()]
    pub oauth_token_url: Option<String>,

    /// OAuth profile endpoint override, primarily for tests.
    #[ortho_config()]
    pub oauth_user_url: Option<String>,

    /// API key for the generative-text provider.
    #[ortho_config()]
    pub ai_api_key: Option<String>,

    /// Base URL of the generative-text provider.
    #[ortho_config()]
    pub ai_base_url: String,

    /// Model identifier for generation requests.
    #[ortho_config()]
    pub ai_model: String,

    /// Outer timeout for generative-model calls, in seconds.
    #[ortho_config()]
    pub ai_timeout_seconds: u64,

    /// Runs database migrations and exits without serving.
    #[ortho_config()]
    pub migrate_db: bool,
}

impl Default for TestsmithConfig {
    fn default() -> Self {
        Self {
            github_client_id: None,
            github_client_secret: None,
            session_secret: None,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            frontend_url: DEFAULT_FRONTEND_URL.to_owned(),
            bind_address: DEFAULT_BIND_ADDRESS.to_owned(),
            database_url: None,
            github_api_base: DEFAULT_GITHUB_API_BASE.to_owned(),
            oauth_token_url: None,
            oauth_user_url: None,
            ai_api_key: None,
            ai_base_url: DEFAULT_AI_BASE_URL.to_owned(),
            ai_model: DEFAULT_AI_MODEL.to_owned(),
            ai_timeout_seconds: DEFAULT_AI_TIMEOUT_SECONDS,
            migrate_db: false,
        }
    }
}

impl TestsmithConfig {
    /// Resolves the OAuth client id and secret, falling back to the legacy
    /// `GITHUB_CLIENT_ID` / `GITHUB_CLIENT_SECRET` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] when either value is absent from
    /// every source.
    pub fn resolve_oauth_client(&self) -> Result<(String, String), ConfigError> {
        let client_id = self
            .github_client_id
            .clone()
            .or_else(|| env::var("GITHUB_CLIENT_ID").ok())
            .ok_or_else(|| missing("OAuth client id", "--github-client-id", "GITHUB_CLIENT_ID"))?;
        let client_secret = self
            .github_client_secret
            .clone()
            .or_else(|| env::var("GITHUB_CLIENT_SECRET").ok())
            .ok_or_else(|| {
                missing(
                    "OAuth client secret",
                    "--github-client-secret",
                    "GITHUB_CLIENT_SECRET",
                )
            })?;
        Ok((client_id, client_secret))
    }

    /// Returns the session signing secret or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] when no secret is configured.
    pub fn require_session_secret(&self) -> Result<&str, ConfigError> {
        self.session_secret.as_deref().ok_or_else(|| {
            missing(
                "session signing secret",
                "--session-secret",
                "TESTSMITH_SESSION_SECRET",
            )
        })
    }

    /// Returns the database URL or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] when no database URL is
    /// configured.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url.as_deref().ok_or_else(|| {
            missing(
                "database URL",
                "--database-url",
                "TESTSMITH_DATABASE_URL",
            )
        })
    }

    /// Resolves the generative-provider API key, falling back to the legacy
    /// `GEMINI_API_KEY` environment variable.
    #[must_use]
    pub fn resolve_ai_api_key(&self) -> Option<String> {
        self.ai_api_key
            .clone()
            .or_else(|| env::var("GEMINI_API_KEY").ok())
    }

    /// Assembles the OAuth exchange configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] when the client id or secret is
    /// absent.
    pub fn oauth_config(&self) -> Result<OAuthConfig, ConfigError> {
        let (client_id, client_secret) = self.resolve_oauth_client()?;
        let mut config = OAuthConfig::new(client_id, client_secret);
        if let (Some(token_url), Some(user_url)) =
            (self.oauth_token_url.as_ref(), self.oauth_user_url.as_ref())
        {
            config = config.with_endpoints(token_url.clone(), user_url.clone());
        }
        Ok(config)
    }

    /// Assembles the generative-client configuration.
    #[must_use]
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig::new(
            self.ai_base_url.clone(),
            self.ai_model.clone(),
            self.resolve_ai_api_key(),
            Duration::from_secs(self.ai_timeout_seconds),
        )
    }
}

fn missing(what: &str, flag: &str, env_var: &str) -> ConfigError {
    ConfigError::MissingValue {
        message: format!("{what} is required (use {flag} or {env_var})"),
    }
}
