//! Axum HTTP surface for the orchestration pipeline.
//!
//! Handlers stay thin: the authenticated-request gate runs as an extractor,
//! and each route delegates to the auth, github, ai, or publisher component.
//! Failures are rendered as JSON bodies carrying at least `message`, plus a
//! machine-readable `code` for the gate and upstream failure kinds.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use axum::routing::{get, post};
use http::{HeaderValue, Method, header};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ai::AiError;
use crate::auth::AuthError;
use crate::config::{ConfigError, TestsmithConfig};
use crate::persistence::{PersistenceError, migrate_database};
use crate::telemetry::StderrJsonlTelemetrySink;

pub use error::ApiError;
pub use state::AppState;

/// Errors raised while booting or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Configuration could not be loaded or was incomplete.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The database could not be prepared.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// An authentication component could not be constructed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The generative client could not be constructed.
    #[error(transparent)]
    Ai(#[from] AiError),

    /// Binding or serving the listener failed.
    #[error("server I/O error: {message}")]
    Io {
        /// Error detail from the runtime.
        message: String,
    },
}

/// Builds the application router over the given state.
#[must_use]
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.frontend_url);

    Router::new()
        .route("/api/auth/github/callback", get(routes::github_callback))
        .route("/api/auth/me", get(routes::me))
        .route("/api/github/files", get(routes::list_files))
        .route("/api/github/file", get(routes::file_content))
        .route("/api/github/pr", post(routes::publish_pr))
        .route("/api/ai/summaries", post(routes::summaries))
        .route("/api/ai/generate", post(routes::generate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy admitting only the configured front-end origin.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(frontend_url, "front-end origin is not a valid header value");
            layer
        }
    }
}

/// Prepares the database, assembles the application state, and serves until
/// the listener fails.
///
/// # Errors
///
/// Returns [`ServeError`] when configuration is incomplete, migrations fail,
/// a component cannot be constructed, or the listener cannot be bound.
pub async fn run(config: TestsmithConfig) -> Result<(), ServeError> {
    let database_url = config.require_database_url()?.to_owned();
    let schema_version = migrate_database(&database_url, &StderrJsonlTelemetrySink)?;
    tracing::info!(schema_version = %schema_version.as_str(), "database ready");

    if config.migrate_db {
        return Ok(());
    }

    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .map_err(|error| ServeError::Io {
            message: format!("failed to bind {}: {error}", config.bind_address),
        })?;
    tracing::info!(address = %config.bind_address, "listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| ServeError::Io {
            message: error.to_string(),
        })
}
