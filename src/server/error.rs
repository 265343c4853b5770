//! JSON error responses with stable machine-readable codes.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

use crate::ai::AiError;
use crate::auth::AuthError;
use crate::github::GatewayError;
use crate::persistence::PersistenceError;
use crate::publisher::PublishError;

/// An HTTP error rendered as `{"message": ..., "code": ...}`.
///
/// Authentication-gate rejections map to 401 with their gate code; upstream
/// integration failures map to 500 with the upstream message attached for
/// diagnostics; request-shape problems map to 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl ApiError {
    /// Creates an error with an explicit status and no code.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a machine-readable code.
    #[must_use]
    pub const fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Creates a 400 response for a malformed request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// The response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message.as_str(),
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        let status = if error.is_gate_rejection() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, error.to_string()).with_code(error.code())
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        let status = match &error {
            GatewayError::MissingRepository | GatewayError::InvalidUrl(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.to_string()).with_code(error.code())
    }
}

impl From<AiError> for ApiError {
    fn from(error: AiError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).with_code(error.code())
    }
}

impl From<PublishError> for ApiError {
    fn from(error: PublishError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).with_code(error.code())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(error: PersistenceError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            .with_code("IDENTITY_STORE_ERROR")
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::ApiError;
    use crate::auth::AuthError;
    use crate::github::GatewayError;

    #[test]
    fn gate_rejections_map_to_unauthorised() {
        let error = ApiError::from(AuthError::MissingHeader);
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);

        let error = ApiError::from(AuthError::ExpiredCredential);
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn upstream_failures_map_to_server_error() {
        let error = ApiError::from(GatewayError::RepoAccess {
            message: "walk tree failed".to_owned(),
        });
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let error = ApiError::from(AuthError::CodeExchangeFailed {
            message: "bad code".to_owned(),
        });
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn request_shape_problems_map_to_bad_request() {
        let error = ApiError::from(GatewayError::MissingRepository);
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }
}
