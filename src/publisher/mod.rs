//! Pull request publishing for generated test files.
//!
//! Given generated files, the publisher creates a branch at the base head,
//! commits every file sequentially through the repository content gateway,
//! and opens a pull request. A failure on any single commit aborts the
//! remaining commits and leaves the branch partially populated; there is no
//! compensating rollback, since branch deletion is cheap for a human operator
//! to perform manually.

use thiserror::Error;

use crate::github::{CreatedPullRequest, GatewayError, RepositoryContentGateway, RepositoryLocator};

/// One generated test file to commit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct GeneratedTestFile {
    /// Path for the new file relative to the repository root.
    pub path: String,
    /// Generated source text.
    pub code: String,
}

/// Everything required to open one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    /// Branch the pull request targets.
    pub base_branch: String,
    /// New branch to create at the base head. Must not collide with an
    /// existing branch; no automatic uniquification is attempted.
    pub branch_name: String,
    /// Pull request title.
    pub title: String,
    /// Pull request body.
    pub body: String,
    /// Files to commit onto the new branch, in order.
    pub files: Vec<GeneratedTestFile>,
}

/// Errors surfaced while publishing a pull request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    /// Base resolution failed or the branch name already exists.
    #[error("branch creation failed: {message}")]
    BranchCreateFailed {
        /// Upstream error detail.
        message: String,
    },

    /// A file commit failed; later files were never committed.
    #[error("commit of {path} failed: {message}")]
    FileCommitFailed {
        /// Path of the file whose commit failed.
        path: String,
        /// Upstream error detail.
        message: String,
    },

    /// The upstream rejected the pull request (e.g. no diff, permissions).
    #[error("pull request creation failed: {message}")]
    PrCreateFailed {
        /// Upstream error detail.
        message: String,
    },
}

impl PublishError {
    /// Stable machine-readable code attached to HTTP error bodies.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BranchCreateFailed { .. } => "BRANCH_CREATE_FAILED",
            Self::FileCommitFailed { .. } => "FILE_COMMIT_FAILED",
            Self::PrCreateFailed { .. } => "PR_CREATE_FAILED",
        }
    }
}

/// Publishes generated test files as a pull request through a gateway.
pub struct PullRequestPublisher<'client, Gateway>
where
    Gateway: RepositoryContentGateway + ?Sized,
{
    gateway: &'client Gateway,
}

impl<'client, Gateway> PullRequestPublisher<'client, Gateway>
where
    Gateway: RepositoryContentGateway + ?Sized,
{
    /// Create a publisher using the provided gateway.
    #[must_use]
    pub const fn new(gateway: &'client Gateway) -> Self {
        Self { gateway }
    }

    /// Creates the branch, commits every file in order, and opens the pull
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::BranchCreateFailed`] when the base head cannot
    /// be resolved or the ref cannot be created,
    /// [`PublishError::FileCommitFailed`] when any single commit fails
    /// (remaining commits are aborted and the branch is left as-is), and
    /// [`PublishError::PrCreateFailed`] when opening the pull request is
    /// rejected.
    pub async fn publish(
        &self,
        locator: &RepositoryLocator,
        draft: &PullRequestDraft,
    ) -> Result<CreatedPullRequest, PublishError> {
        let base_sha = self
            .gateway
            .branch_head(locator, &draft.base_branch)
            .await
            .map_err(|error| branch_create_failed(&error))?;

        self.gateway
            .create_branch(locator, &draft.branch_name, &base_sha)
            .await
            .map_err(|error| branch_create_failed(&error))?;

        for file in &draft.files {
            self.gateway
                .commit_file(
                    locator,
                    &draft.branch_name,
                    &file.path,
                    &file.code,
                    &commit_message(&file.path),
                )
                .await
                .map_err(|error| PublishError::FileCommitFailed {
                    path: file.path.clone(),
                    message: error.to_string(),
                })?;
        }

        let created = self
            .gateway
            .open_pull_request(
                locator,
                &draft.title,
                &draft.branch_name,
                &draft.base_branch,
                &draft.body,
            )
            .await
            .map_err(|error| PublishError::PrCreateFailed {
                message: error.to_string(),
            })?;

        tracing::info!(number = created.number, "pull request opened");
        Ok(created)
    }
}

fn commit_message(path: &str) -> String {
    format!("chore: add generated test {path}")
}

fn branch_create_failed(error: &GatewayError) -> PublishError {
    PublishError::BranchCreateFailed {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests;
