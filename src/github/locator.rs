//! Identity wrappers and API path construction for repository access.

use url::Url;

use super::error::GatewayError;

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, GatewayError> {
        if value.is_empty() {
            return Err(GatewayError::MissingRepository);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, GatewayError> {
        if value.is_empty() {
            return Err(GatewayError::MissingRepository);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Delegated access token wrapper enforcing presence.
///
/// The token is issued by the OAuth provider and stored per identity; the
/// gateway uses it to act on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GatewayError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GatewayError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Target repository with its derived API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Creates a locator targeting the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::MissingRepository` when owner or repo is empty.
    pub fn from_owner_repo(owner: &str, repo: &str) -> Result<Self, GatewayError> {
        Self::with_api_base("https://api.github.com", owner, repo)
    }

    /// Creates a locator against an explicit API base URL.
    ///
    /// Used for GitHub Enterprise hosts and for pointing tests at a fake
    /// upstream.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` when the base URL cannot be parsed
    /// and `GatewayError::MissingRepository` when owner or repo is empty.
    pub fn with_api_base(api_base: &str, owner: &str, repo: &str) -> Result<Self, GatewayError> {
        let validated_owner = RepositoryOwner::new(owner)?;
        let repository = RepositoryName::new(repo)?;
        let parsed = Url::parse(api_base)
            .map_err(|error| GatewayError::InvalidUrl(error.to_string()))?;

        Ok(Self {
            api_base: parsed,
            owner: validated_owner,
            repository,
        })
    }

    /// API base URL for the repository host.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    pub(crate) fn git_ref_path(&self, branch: &str) -> String {
        format!(
            "/repos/{}/{}/git/ref/heads/{branch}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    pub(crate) fn git_commit_path(&self, commit_sha: &str) -> String {
        format!(
            "/repos/{}/{}/git/commits/{commit_sha}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    pub(crate) fn git_tree_path(&self, tree_sha: &str) -> String {
        format!(
            "/repos/{}/{}/git/trees/{tree_sha}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    pub(crate) fn contents_path(&self, file_path: &str) -> String {
        format!(
            "/repos/{}/{}/contents/{file_path}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    pub(crate) fn git_refs_path(&self) -> String {
        format!(
            "/repos/{}/{}/git/refs",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    pub(crate) fn pulls_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }
}
