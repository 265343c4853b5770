//! The authenticated-request gate.
//!
//! Every privileged operation passes through [`CredentialVerifier::resolve`],
//! which turns the raw `Authorization` header into an
//! [`AuthenticatedIdentity`] carrying the delegated access token for
//! downstream gateway calls. The gate never mutates the identity store.

use crate::github::AccessToken;
use crate::persistence::IdentityStore;

use super::credential::CredentialSigner;
use super::error::AuthError;

/// The resolved caller identity attached to a request after verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    /// Internal identity id.
    pub id: i64,
    /// GitHub account id.
    pub github_id: String,
    /// GitHub login name.
    pub login: String,
    /// Delegated access token used for GitHub API calls on the caller's
    /// behalf.
    pub access_token: AccessToken,
}

/// Resolves bearer credentials to stored identities.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    signer: CredentialSigner,
    identities: IdentityStore,
}

impl CredentialVerifier {
    /// Creates a verifier over the given signer and identity store.
    #[must_use]
    pub const fn new(signer: CredentialSigner, identities: IdentityStore) -> Self {
        Self { signer, identities }
    }

    /// Resolves the `Authorization` header value to an identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingHeader`] when no header was supplied,
    /// [`AuthError::MalformedHeader`] when it does not use the Bearer scheme,
    /// [`AuthError::InvalidCredential`] / [`AuthError::ExpiredCredential`]
    /// when verification fails, and [`AuthError::IdentityNotFound`] when the
    /// credential references an identity that no longer exists (the account
    /// may have been removed after the credential was issued).
    pub fn resolve(&self, authorization: Option<&str>) -> Result<AuthenticatedIdentity, AuthError> {
        let header = authorization.ok_or(AuthError::MissingHeader)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MalformedHeader)?;

        let claims = self.signer.verify(token)?;

        let identity = self
            .identities
            .find_by_id(claims.identity_id)
            .map_err(|error| AuthError::Store {
                message: error.to_string(),
            })?
            .ok_or(AuthError::IdentityNotFound)?;

        let access_token =
            AccessToken::new(&identity.access_token).map_err(|error| AuthError::Store {
                message: format!("stored access token is unusable: {error}"),
            })?;

        tracing::debug!(login = %identity.login, "request authenticated");

        Ok(AuthenticatedIdentity {
            id: identity.id,
            github_id: identity.github_id,
            login: identity.login,
            access_token,
        })
    }
}
