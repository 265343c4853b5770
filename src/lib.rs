//! Testsmith library crate providing AI-assisted test generation for GitHub
//! repositories.
//!
//! The library wires together GitHub OAuth login with stateless session
//! credentials, an Octocrab-backed repository content gateway, an AI
//! orchestration layer that turns selected files into test-case summaries
//! and generated test code, and a pull request publisher that lands the
//! generated files on a new branch. Errors are mapped into user-friendly
//! variants with stable machine-readable codes so the HTTP surface can
//! report precise failures.

pub mod ai;
pub mod auth;
pub mod config;
pub mod github;
pub mod persistence;
pub mod publisher;
pub mod server;
pub mod telemetry;

pub use ai::{SourceFile, TestGenerationService, TestSummary};
pub use auth::{AuthenticatedIdentity, CredentialSigner, CredentialVerifier};
pub use config::TestsmithConfig;
pub use github::{AccessToken, OctocrabContentGateway, RepositoryContentGateway, RepositoryLocator};
pub use publisher::{PullRequestDraft, PullRequestPublisher};
pub use server::{AppState, router};
