//! Data models for repository trees, blob contents, and created pull
//! requests.

use serde::{Deserialize, Serialize};

/// Descriptor for one blob entry in a repository tree.
///
/// Produced transiently by the tree listing call and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryFile {
    /// Path relative to the repository root.
    pub path: String,
    /// Content blob identifier.
    pub sha: String,
}

/// One file's decoded text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    /// Path relative to the repository root.
    pub path: String,
    /// Decoded text content.
    pub content: String,
}

/// Minimal details of a pull request opened by the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPullRequest {
    /// Pull request number.
    pub number: u64,
    /// HTML URL for displaying to a user.
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiGitRef {
    pub(super) object: ApiGitObject,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiGitObject {
    pub(super) sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiGitCommit {
    pub(super) tree: ApiTreeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiTreeRef {
    pub(super) sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiTree {
    pub(super) tree: Vec<ApiTreeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiTreeEntry {
    pub(super) path: String,
    #[serde(rename = "type")]
    pub(super) entry_type: String,
    pub(super) sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiContents {
    pub(super) content: Option<String>,
    pub(super) encoding: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCreatedPullRequest {
    pub(super) number: u64,
    pub(super) html_url: Option<String>,
}

impl From<ApiCreatedPullRequest> for CreatedPullRequest {
    fn from(value: ApiCreatedPullRequest) -> Self {
        Self {
            number: value.number,
            html_url: value.html_url,
        }
    }
}
