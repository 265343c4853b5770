//! Shared fixtures for integration tests.

use std::sync::Arc;

use tempfile::TempDir;

use testsmith::ai::{GeminiClient, GeminiConfig};
use testsmith::auth::{CredentialSigner, CredentialVerifier, GitHubOAuthClient, OAuthConfig};
use testsmith::persistence::{Identity, IdentityStore, IdentityWrite, migrate_database};
use testsmith::server::AppState;
use testsmith::telemetry::NoopTelemetrySink;

/// Fixed deterministic signing secret for integration tests.
pub const SESSION_SECRET: &str = "integration-secret";

/// Session credential lifetime used by the fixtures.
pub const SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Front-end origin configured for the fixtures.
pub const FRONTEND_URL: &str = "http://localhost:5173";

/// An assembled application state over a migrated temporary database.
pub struct TestApp {
    /// Shared application state for building routers.
    pub state: AppState,
    _workdir: TempDir,
}

/// Builds an application state whose upstreams all point at test servers.
///
/// `github_api_base` feeds per-request content gateways, `oauth_base` hosts
/// `/login/oauth/access_token` and `/user`, and `ai_base` hosts the
/// `generateContent` endpoint.
pub fn test_app(github_api_base: &str, oauth_base: &str, ai_base: &str) -> TestApp {
    let workdir = TempDir::new().expect("temp dir should be created");
    let database_url = workdir
        .path()
        .join("identities.sqlite")
        .to_string_lossy()
        .into_owned();
    migrate_database(&database_url, &NoopTelemetrySink).expect("migrations should run");

    let identities = IdentityStore::new(database_url).expect("store should build");
    let signer =
        CredentialSigner::new(SESSION_SECRET, SESSION_TTL_SECONDS).expect("signer should build");
    let verifier = CredentialVerifier::new(signer.clone(), identities.clone());

    let oauth_config = OAuthConfig::new("client-id", "client-secret").with_endpoints(
        format!("{oauth_base}/login/oauth/access_token"),
        format!("{oauth_base}/user"),
    );
    let oauth = Arc::new(GitHubOAuthClient::new(oauth_config).expect("OAuth client should build"));

    let gemini_config = GeminiConfig::new(
        ai_base,
        "gemini-1.5-flash",
        Some("test-key".to_owned()),
        std::time::Duration::from_secs(5),
    );
    let generative = Arc::new(GeminiClient::new(gemini_config).expect("AI client should build"));

    let state = AppState {
        frontend_url: FRONTEND_URL.to_owned(),
        github_api_base: github_api_base.to_owned(),
        identities,
        signer,
        verifier,
        oauth,
        generative,
    };

    TestApp {
        state,
        _workdir: workdir,
    }
}

/// Creates the canonical `octocat` identity used across scenarios.
pub fn seed_identity(identities: &IdentityStore) -> Identity {
    identities
        .upsert(IdentityWrite {
            github_id: "42",
            login: "octocat",
            access_token: "gho_token",
        })
        .expect("identity should upsert")
}

/// Builds a Bearer header value for the given identity id.
pub fn bearer_for(signer: &CredentialSigner, identity_id: i64) -> String {
    format!(
        "Bearer {}",
        signer
            .sign(identity_id)
            .expect("signing should succeed")
            .value()
    )
}
