//! Axum extractor running the authenticated-request gate.

use axum::extract::FromRequestParts;
use http::header::AUTHORIZATION;
use http::request::Parts;

use crate::auth::AuthenticatedIdentity;

use super::error::ApiError;
use super::state::AppState;

impl FromRequestParts<AppState> for AuthenticatedIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        state
            .verifier
            .resolve(authorization)
            .map_err(ApiError::from)
    }
}
