//! GitHub repository content retrieval.
//!
//! This module wraps Octocrab behind a trait-based gateway that walks a
//! branch's tree, fetches blob contents, and commits generated files. Errors
//! are mapped into user-friendly variants so callers can surface precise
//! failures without exposing Octocrab internals. There is deliberately no
//! caching: every call hits the upstream API, and the trait seam exists so a
//! cache can be introduced later without touching callers.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;

pub use error::GatewayError;
pub use gateway::{OctocrabContentGateway, RepositoryContentGateway};
pub use locator::{AccessToken, RepositoryLocator, RepositoryName, RepositoryOwner};
pub use models::{CreatedPullRequest, FileContent, RepositoryFile};

#[cfg(test)]
pub use gateway::MockRepositoryContentGateway;
