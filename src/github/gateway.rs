//! Octocrab-backed gateway for repository content operations.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests. Every operation authenticates
//! with the caller's delegated access token; no responses are cached.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::{StatusCode, Uri};
use octocrab::Octocrab;
use serde::Serialize;

use super::error::GatewayError;
use super::locator::{AccessToken, RepositoryLocator};
use super::models::{
    ApiContents, ApiCreatedPullRequest, ApiGitCommit, ApiGitRef, ApiTree, CreatedPullRequest,
    FileContent, RepositoryFile,
};

/// Builds an Octocrab client for the given token and API base URL.
///
/// # Errors
///
/// Returns `GatewayError::InvalidUrl` when the base URI cannot be parsed or
/// `GatewayError::Api` when Octocrab fails to construct a client.
fn build_octocrab_client(token: &AccessToken, api_base: &str) -> Result<Octocrab, GatewayError> {
    let base_uri: Uri = api_base
        .parse::<Uri>()
        .map_err(|error| GatewayError::InvalidUrl(error.to_string()))?;

    Octocrab::builder()
        .personal_token(token.as_ref())
        .base_uri(base_uri)
        .map_err(|error| GatewayError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}

/// Gateway for repository content operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryContentGateway: Send + Sync {
    /// Resolves the branch head commit, walks its tree recursively, and
    /// returns a descriptor for every blob entry.
    ///
    /// Directories are excluded and all nesting levels are flattened into a
    /// single sequence following the upstream tree ordering.
    async fn list_files(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
    ) -> Result<Vec<RepositoryFile>, GatewayError>;

    /// Fetches one blob and returns its decoded text content.
    async fn file_content<'a>(
        &self,
        locator: &RepositoryLocator,
        path: &str,
        reference: Option<&'a str>,
    ) -> Result<FileContent, GatewayError>;

    /// Creates or updates one file on the given branch.
    async fn commit_file(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), GatewayError>;

    /// Resolves the head commit sha of a branch.
    async fn branch_head(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
    ) -> Result<String, GatewayError>;

    /// Creates a new branch ref at the given commit sha.
    async fn create_branch(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
        commit_sha: &str,
    ) -> Result<(), GatewayError>;

    /// Opens a pull request from `head` into `base`.
    async fn open_pull_request(
        &self,
        locator: &RepositoryLocator,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<CreatedPullRequest, GatewayError>;
}

/// Octocrab-backed gateway.
pub struct OctocrabContentGateway {
    client: Octocrab,
}

impl OctocrabContentGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an Octocrab client for the given token and repository locator.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` when the base URI cannot be parsed
    /// or `GatewayError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: &AccessToken,
        locator: &RepositoryLocator,
    ) -> Result<Self, GatewayError> {
        let octocrab = build_octocrab_client(token, locator.api_base().as_str())?;
        Ok(Self::new(octocrab))
    }

    async fn tree_sha_for_branch(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
    ) -> Result<String, GatewayError> {
        let git_ref: ApiGitRef = self
            .client
            .get(locator.git_ref_path(branch), None::<&()>)
            .await
            .map_err(|error| repo_access("resolve branch head", &error))?;

        let commit: ApiGitCommit = self
            .client
            .get(locator.git_commit_path(&git_ref.object.sha), None::<&()>)
            .await
            .map_err(|error| repo_access("read head commit", &error))?;

        Ok(commit.tree.sha)
    }
}

#[derive(Debug, Serialize)]
struct CommitFileRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePullRequest<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[async_trait]
impl RepositoryContentGateway for OctocrabContentGateway {
    async fn list_files(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
    ) -> Result<Vec<RepositoryFile>, GatewayError> {
        let tree_sha = self.tree_sha_for_branch(locator, branch).await?;

        let query_params = [("recursive", "1")];
        let tree: ApiTree = self
            .client
            .get(locator.git_tree_path(&tree_sha), Some(&query_params))
            .await
            .map_err(|error| repo_access("walk tree", &error))?;

        Ok(tree
            .tree
            .into_iter()
            .filter(|entry| entry.entry_type == "blob")
            .map(|entry| RepositoryFile {
                path: entry.path,
                sha: entry.sha,
            })
            .collect())
    }

    async fn file_content<'a>(
        &self,
        locator: &RepositoryLocator,
        path: &str,
        reference: Option<&'a str>,
    ) -> Result<FileContent, GatewayError> {
        let query_params: Vec<(&str, &str)> = reference
            .map(|value| vec![("ref", value)])
            .unwrap_or_default();

        let contents: ApiContents = self
            .client
            .get(locator.contents_path(path), Some(&query_params))
            .await
            .map_err(|error| file_access("fetch file", &error))?;

        let content = decode_blob_content(path, &contents)?;
        Ok(FileContent {
            path: path.to_owned(),
            content,
        })
    }

    async fn commit_file(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), GatewayError> {
        let payload = CommitFileRequest {
            message,
            content: BASE64.encode(content.as_bytes()),
            branch,
        };

        let _response: serde_json::Value = self
            .client
            .put(locator.contents_path(path), Some(&payload))
            .await
            .map_err(|error| map_octocrab_error("commit file", &error))?;

        Ok(())
    }

    async fn branch_head(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
    ) -> Result<String, GatewayError> {
        let git_ref: ApiGitRef = self
            .client
            .get(locator.git_ref_path(branch), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("resolve branch head", &error))?;

        Ok(git_ref.object.sha)
    }

    async fn create_branch(
        &self,
        locator: &RepositoryLocator,
        branch: &str,
        commit_sha: &str,
    ) -> Result<(), GatewayError> {
        let payload = CreateRefRequest {
            git_ref: format!("refs/heads/{branch}"),
            sha: commit_sha,
        };

        let _response: serde_json::Value = self
            .client
            .post(locator.git_refs_path(), Some(&payload))
            .await
            .map_err(|error| map_octocrab_error("create branch", &error))?;

        Ok(())
    }

    async fn open_pull_request(
        &self,
        locator: &RepositoryLocator,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<CreatedPullRequest, GatewayError> {
        let payload = CreatePullRequest {
            title,
            head,
            base,
            body,
        };

        self.client
            .post::<_, ApiCreatedPullRequest>(locator.pulls_path(), Some(&payload))
            .await
            .map(ApiCreatedPullRequest::into)
            .map_err(|error| map_octocrab_error("open pull request", &error))
    }
}

/// Decodes blob content using the transport encoding reported by the API.
///
/// The encoding is never assumed; an unreported or unsupported encoding is a
/// file access failure.
fn decode_blob_content(path: &str, contents: &ApiContents) -> Result<String, GatewayError> {
    let encoding = contents
        .encoding
        .as_deref()
        .ok_or_else(|| GatewayError::FileAccess {
            message: format!("no content encoding reported for {path}"),
        })?;

    match encoding {
        "base64" => {
            let raw = contents
                .content
                .as_deref()
                .ok_or_else(|| GatewayError::FileAccess {
                    message: format!("no content returned for {path}"),
                })?;

            let cleaned: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
            let bytes = BASE64
                .decode(cleaned.as_bytes())
                .map_err(|error| GatewayError::FileAccess {
                    message: format!("base64 decoding failed for {path}: {error}"),
                })?;

            String::from_utf8(bytes).map_err(|error| GatewayError::FileAccess {
                message: format!("content for {path} is not valid UTF-8: {error}"),
            })
        }
        other => Err(GatewayError::FileAccess {
            message: format!("unsupported content encoding `{other}` for {path}"),
        }),
    }
}

// --- Error mapping helpers ---

/// Checks if a GitHub error status indicates an authentication failure.
const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Checks if an octocrab error represents a network/transport issue.
const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

fn upstream_detail(operation: &str, error: &octocrab::Error) -> String {
    if let octocrab::Error::GitHub { source, .. } = error {
        return format!(
            "{operation} failed with status {status}: {message}",
            status = source.status_code,
            message = source.message
        );
    }

    format!("{operation} failed: {error}")
}

fn repo_access(operation: &str, error: &octocrab::Error) -> GatewayError {
    GatewayError::RepoAccess {
        message: upstream_detail(operation, error),
    }
}

fn file_access(operation: &str, error: &octocrab::Error) -> GatewayError {
    GatewayError::FileAccess {
        message: upstream_detail(operation, error),
    }
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> GatewayError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return if is_auth_failure(source.status_code) {
            GatewayError::Authentication {
                message: format!(
                    "{operation} failed: GitHub returned {status} {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        } else {
            GatewayError::Api {
                message: upstream_detail(operation, error),
            }
        };
    }

    if is_network_error(error) {
        return GatewayError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    GatewayError::Api {
        message: format!("{operation} failed: {error}"),
    }
}
