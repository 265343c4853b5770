//! Request handlers for the authentication, repository, AI, and publishing
//! endpoints.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};

use crate::ai::{SourceFile, TestGenerationService, TestSummary};
use crate::auth::{AuthError, AuthenticatedIdentity, login_with_code};
use crate::github::{
    CreatedPullRequest, FileContent, OctocrabContentGateway, RepositoryContentGateway,
    RepositoryFile, RepositoryLocator,
};
use crate::publisher::{GeneratedTestFile, PullRequestDraft, PullRequestPublisher};

use super::error::ApiError;
use super::state::AppState;

const DEFAULT_BRANCH: &str = "main";

// ── OAuth callback ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct CallbackParams {
    code: Option<String>,
}

/// Completes the OAuth login and redirects to the front end with the session
/// credential appended as a query parameter.
///
/// The URL-embedded token is a one-time transport mechanism: the credential
/// is short-lived and the channel is a TLS redirect that is not logged
/// further.
pub(super) async fn github_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(code) = params.code else {
        return ApiError::bad_request("Missing code").into_response();
    };

    match login_with_code(state.oauth.as_ref(), &state.identities, &state.signer, &code).await {
        Ok(credential) => Redirect::to(&format!(
            "{}/?token={}",
            state.frontend_url,
            credential.value()
        ))
        .into_response(),
        Err(error @ AuthError::MintFailed { .. }) => {
            tracing::error!(%error, "session credential could not be minted");
            Redirect::to(&format!("{}/login?error=token_failure", state.frontend_url))
                .into_response()
        }
        Err(error) => {
            tracing::warn!(%error, "OAuth callback failed");
            ApiError::from(error).into_response()
        }
    }
}

// ── Identity lookup ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(super) struct MeResponse {
    user: MeUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeUser {
    id: i64,
    github_id: String,
    login: String,
    access_token: String,
}

/// Returns the resolved identity's fields.
///
/// The delegated access token is included in the response body; DESIGN.md
/// records that decision.
pub(super) async fn me(identity: AuthenticatedIdentity) -> Json<MeResponse> {
    Json(MeResponse {
        user: MeUser {
            id: identity.id,
            github_id: identity.github_id,
            login: identity.login,
            access_token: identity.access_token.value().to_owned(),
        },
    })
}

// ── Repository content ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct FilesQuery {
    owner: String,
    repo: String,
    branch: Option<String>,
}

/// Lists every blob in the repository tree at the branch head.
pub(super) async fn list_files(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Query(query): Query<FilesQuery>,
) -> Result<Json<Vec<RepositoryFile>>, ApiError> {
    let locator =
        RepositoryLocator::with_api_base(&state.github_api_base, &query.owner, &query.repo)?;
    let gateway = OctocrabContentGateway::for_token(&identity.access_token, &locator)?;

    let files = gateway
        .list_files(&locator, query.branch.as_deref().unwrap_or(DEFAULT_BRANCH))
        .await?;

    Ok(Json(files))
}

#[derive(Debug, Deserialize)]
pub(super) struct FileQuery {
    owner: String,
    repo: String,
    path: String,
    #[serde(rename = "ref")]
    reference: Option<String>,
}

/// Fetches one blob's decoded text content.
pub(super) async fn file_content(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Query(query): Query<FileQuery>,
) -> Result<Json<FileContent>, ApiError> {
    let locator =
        RepositoryLocator::with_api_base(&state.github_api_base, &query.owner, &query.repo)?;
    let gateway = OctocrabContentGateway::for_token(&identity.access_token, &locator)?;

    let content = gateway
        .file_content(&locator, &query.path, query.reference.as_deref())
        .await?;

    Ok(Json(content))
}

// ── AI orchestration ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct SummariesRequest {
    files: Option<Vec<SourceFile>>,
}

#[derive(Debug, Serialize)]
pub(super) struct SummariesResponse {
    summaries: Vec<TestSummary>,
}

/// Proposes test-case summaries for the submitted files.
pub(super) async fn summaries(
    State(state): State<AppState>,
    _identity: AuthenticatedIdentity,
    Json(request): Json<SummariesRequest>,
) -> Result<Json<SummariesResponse>, ApiError> {
    let files = request.files.unwrap_or_default();
    if files.is_empty() {
        return Err(ApiError::bad_request("files required"));
    }

    let service = TestGenerationService::new(state.generative.as_ref());
    let summaries = service.summarise(&files).await?;

    Ok(Json(SummariesResponse { summaries }))
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateRequest {
    files: Option<Vec<SourceFile>>,
    summary: Option<String>,
}

/// Generates test source code for a chosen summary.
///
/// The response body is the generated text itself, not a wrapper object.
pub(super) async fn generate(
    State(state): State<AppState>,
    _identity: AuthenticatedIdentity,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<String>, ApiError> {
    let (Some(files), Some(summary)) = (request.files, request.summary) else {
        return Err(ApiError::bad_request("files & summary required"));
    };
    if files.is_empty() {
        return Err(ApiError::bad_request("files & summary required"));
    }

    let service = TestGenerationService::new(state.generative.as_ref());
    let code = service.generate_code(&files, &summary).await?;

    Ok(Json(code))
}

// ── Pull request publishing ────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PublishRequest {
    owner: String,
    repo: String,
    base_branch: Option<String>,
    branch_name: String,
    files: Vec<GeneratedTestFile>,
    title: String,
    body: Option<String>,
}

/// Opens a pull request containing the generated test files.
pub(super) async fn publish_pr(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Json(request): Json<PublishRequest>,
) -> Result<Json<CreatedPullRequest>, ApiError> {
    if request.files.is_empty() {
        return Err(ApiError::bad_request("files required"));
    }

    let locator =
        RepositoryLocator::with_api_base(&state.github_api_base, &request.owner, &request.repo)?;
    let gateway = OctocrabContentGateway::for_token(&identity.access_token, &locator)?;

    let draft = PullRequestDraft {
        base_branch: request
            .base_branch
            .unwrap_or_else(|| DEFAULT_BRANCH.to_owned()),
        branch_name: request.branch_name,
        title: request.title,
        body: request.body.unwrap_or_default(),
        files: request.files,
    };

    let publisher = PullRequestPublisher::new(&gateway);
    let created = publisher.publish(&locator, &draft).await?;

    Ok(Json(created))
}
