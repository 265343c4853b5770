//! Stateless signed session credentials.
//!
//! A session credential is an HMAC-signed token carrying the identity's
//! internal id plus issue and expiry timestamps. Nothing is persisted
//! server-side; validity is determined purely by signature and expiry at
//! verification time. Credentials are minted once per successful OAuth
//! exchange and expire after a fixed duration with no early revocation.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Default credential lifetime: seven days.
pub const DEFAULT_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// An opaque signed session credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    /// Borrow the encoded credential value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for SessionCredential {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Verified claims extracted from a session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialClaims {
    /// Internal identity id the credential is bound to.
    pub identity_id: i64,
    /// Unix timestamp when the credential was issued.
    pub issued_at: i64,
    /// Unix timestamp when the credential expires.
    pub expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session credentials with a single symmetric secret and
/// a single fixed algorithm (HMAC-SHA256).
///
/// The secret and TTL are explicit constructor parameters so tests can use a
/// fixed deterministic secret.
#[derive(Debug, Clone)]
pub struct CredentialSigner {
    secret: String,
    ttl_seconds: i64,
}

impl CredentialSigner {
    /// Creates a signer from an explicit secret and credential lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSigningSecret`] when the secret is blank;
    /// a missing secret is a server misconfiguration, not a caller error.
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Result<Self, AuthError> {
        let secret_string = secret.into();
        if secret_string.trim().is_empty() {
            return Err(AuthError::MissingSigningSecret);
        }
        Ok(Self {
            secret: secret_string,
            ttl_seconds,
        })
    }

    /// Mints a credential bound to the given internal identity id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MintFailed`] when signing fails. This is a fatal
    /// path with no retry; it indicates a server misconfiguration.
    pub fn sign(&self, identity_id: i64) -> Result<SessionCredential, AuthError> {
        let issued_at = Utc::now().timestamp();
        self.sign_window(identity_id, issued_at, issued_at.saturating_add(self.ttl_seconds))
    }

    /// Mints a credential with an explicit issue/expiry window.
    ///
    /// Exposed for deterministic expiry tests.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MintFailed`] when signing fails.
    #[cfg(any(test, feature = "test-support"))]
    pub fn sign_with_window(
        &self,
        identity_id: i64,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<SessionCredential, AuthError> {
        self.sign_window(identity_id, issued_at, expires_at)
    }

    fn sign_window(
        &self,
        identity_id: i64,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<SessionCredential, AuthError> {
        let claims = Claims {
            sub: identity_id.to_string(),
            iat: issued_at,
            exp: expires_at,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map(SessionCredential)
        .map_err(|error| AuthError::MintFailed {
            message: error.to_string(),
        })
    }

    /// Verifies a credential's signature and expiry and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ExpiredCredential`] when the embedded expiry has
    /// passed (even with a valid signature) and
    /// [`AuthError::InvalidCredential`] for any other verification failure.
    pub fn verify(&self, token: &str) -> Result<CredentialClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|error| match error.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
            _ => AuthError::InvalidCredential {
                message: error.to_string(),
            },
        })?;

        let identity_id =
            data.claims
                .sub
                .parse::<i64>()
                .map_err(|_| AuthError::InvalidCredential {
                    message: "credential subject is not an identity id".to_owned(),
                })?;

        Ok(CredentialClaims {
            identity_id,
            issued_at: data.claims.iat,
            expires_at: data.claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialSigner, DEFAULT_TTL_SECONDS};
    use crate::auth::error::AuthError;

    const SECRET: &str = "test-secret";

    fn signer() -> CredentialSigner {
        CredentialSigner::new(SECRET, DEFAULT_TTL_SECONDS).expect("signer should build")
    }

    #[test]
    fn sign_then_verify_round_trips_identity_id() {
        let credential = signer().sign(42).expect("signing should succeed");

        let claims = signer()
            .verify(credential.value())
            .expect("verification should succeed");

        assert_eq!(claims.identity_id, 42);
        assert_eq!(
            claims.expires_at - claims.issued_at,
            DEFAULT_TTL_SECONDS,
            "expiry should sit one TTL after issue"
        );
    }

    #[test]
    fn verify_is_deterministic_for_a_credential() {
        let credential = signer().sign(7).expect("signing should succeed");

        let first = signer().verify(credential.value()).expect("first verify");
        let second = signer().verify(credential.value()).expect("second verify");

        assert_eq!(first, second);
    }

    #[test]
    fn expired_credential_is_rejected_despite_valid_signature() {
        let credential = signer()
            .sign_with_window(42, 1_000, 2_000)
            .expect("signing should succeed");

        let error = signer()
            .verify(credential.value())
            .expect_err("expired credential should be rejected");

        assert_eq!(error, AuthError::ExpiredCredential);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let credential = signer().sign(42).expect("signing should succeed");

        let other =
            CredentialSigner::new("other-secret", DEFAULT_TTL_SECONDS).expect("signer should build");
        let error = other
            .verify(credential.value())
            .expect_err("foreign signature should be rejected");

        assert!(
            matches!(error, AuthError::InvalidCredential { .. }),
            "expected InvalidCredential, got {error:?}"
        );
    }

    #[test]
    fn garbage_token_is_rejected() {
        let error = signer()
            .verify("not-a-token")
            .expect_err("garbage should be rejected");

        assert!(matches!(error, AuthError::InvalidCredential { .. }));
    }

    #[test]
    fn blank_secret_is_rejected_at_construction() {
        let error = CredentialSigner::new("  ", DEFAULT_TTL_SECONDS)
            .expect_err("blank secret should be rejected");

        assert_eq!(error, AuthError::MissingSigningSecret);
    }
}
