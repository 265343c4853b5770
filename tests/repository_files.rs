//! End-to-end repository listing and the authenticated-request gate.

mod support;

use axum::body::Body;
use http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use testsmith::server::router;

use support::{bearer_for, seed_identity, test_app};

async fn mount_demo_repository(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/octo-org/demo/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ref": "refs/heads/main",
            "object": { "type": "commit", "sha": "commit-sha" }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo-org/demo/git/commits/commit-sha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sha": "commit-sha",
            "tree": { "sha": "tree-sha" }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo-org/demo/git/trees/tree-sha"))
        .and(query_param("recursive", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sha": "tree-sha",
            "tree": [
                { "path": "src", "type": "tree", "sha": "dir-sha" },
                { "path": "src/a.js", "type": "blob", "sha": "blob-a" },
                { "path": "src/b.js", "type": "blob", "sha": "blob-b" }
            ]
        })))
        .mount(server)
        .await;
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

#[tokio::test]
async fn listing_returns_exactly_the_blob_descriptors() {
    let github = MockServer::start().await;
    mount_demo_repository(&github).await;

    let app = test_app(&github.uri(), &github.uri(), &github.uri());
    let identity = seed_identity(&app.state.identities);
    let bearer = bearer_for(&app.state.signer, identity.id);

    let response = router(app.state)
        .oneshot(
            Request::builder()
                .uri("/api/github/files?owner=octo-org&repo=demo&branch=main")
                .header("authorization", bearer)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let paths: Vec<&str> = body
        .as_array()
        .expect("body should be an array")
        .iter()
        .map(|entry| entry["path"].as_str().expect("path should be a string"))
        .collect();
    assert_eq!(paths, vec!["src/a.js", "src/b.js"]);
}

#[tokio::test]
async fn missing_repository_is_an_error_not_an_empty_list() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/ghost/nope/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found"
        })))
        .mount(&github)
        .await;

    let app = test_app(&github.uri(), &github.uri(), &github.uri());
    let identity = seed_identity(&app.state.identities);
    let bearer = bearer_for(&app.state.signer, identity.id);

    let response = router(app.state)
        .oneshot(
            Request::builder()
                .uri("/api/github/files?owner=ghost&repo=nope")
                .header("authorization", bearer)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["code"], "REPO_ACCESS_ERROR");
    assert!(
        body["message"]
            .as_str()
            .expect("message should be a string")
            .contains("Not Found"),
        "upstream detail should be surfaced"
    );
}

#[tokio::test]
async fn file_endpoint_returns_decoded_content() {
    use base64::Engine as _;

    let github = MockServer::start().await;
    let source = "function add(a,b){return a+b;}";
    Mock::given(method("GET"))
        .and(path("/repos/octo-org/demo/contents/src/a.js"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "path": "src/a.js",
            "content": base64::engine::general_purpose::STANDARD.encode(source.as_bytes()),
            "encoding": "base64"
        })))
        .mount(&github)
        .await;

    let app = test_app(&github.uri(), &github.uri(), &github.uri());
    let identity = seed_identity(&app.state.identities);
    let bearer = bearer_for(&app.state.signer, identity.id);

    let response = router(app.state)
        .oneshot(
            Request::builder()
                .uri("/api/github/file?owner=octo-org&repo=demo&path=src/a.js")
                .header("authorization", bearer)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["path"], "src/a.js");
    assert_eq!(body["content"], source);
}

#[tokio::test]
async fn requests_without_credentials_never_reach_github() {
    let github = MockServer::start().await;

    let app = test_app(&github.uri(), &github.uri(), &github.uri());
    let response = router(app.state)
        .oneshot(
            Request::builder()
                .uri("/api/github/files?owner=octo-org&repo=demo")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["code"], "MISSING_AUTH_HEADER");

    assert!(
        github
            .received_requests()
            .await
            .expect("request recording should be enabled")
            .is_empty(),
        "the gate must reject before any downstream call"
    );
}

#[tokio::test]
async fn malformed_authorization_header_is_rejected() {
    let github = MockServer::start().await;
    let app = test_app(&github.uri(), &github.uri(), &github.uri());

    let response = router(app.state)
        .oneshot(
            Request::builder()
                .uri("/api/github/files?owner=octo-org&repo=demo")
                .header("authorization", "Token gho_raw")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["code"], "INVALID_AUTH_FORMAT");
}

#[tokio::test]
async fn expired_credential_is_rejected() {
    let github = MockServer::start().await;
    let app = test_app(&github.uri(), &github.uri(), &github.uri());
    let identity = seed_identity(&app.state.identities);

    let expired = app
        .state
        .signer
        .sign_with_window(identity.id, 1_000, 2_000)
        .expect("signing should succeed");

    let response = router(app.state)
        .oneshot(
            Request::builder()
                .uri("/api/github/files?owner=octo-org&repo=demo")
                .header("authorization", format!("Bearer {}", expired.value()))
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn credential_for_a_removed_identity_is_rejected() {
    let github = MockServer::start().await;
    let app = test_app(&github.uri(), &github.uri(), &github.uri());
    let identity = seed_identity(&app.state.identities);
    let bearer = bearer_for(&app.state.signer, identity.id + 999);

    let response = router(app.state)
        .oneshot(
            Request::builder()
                .uri("/api/github/files?owner=octo-org&repo=demo")
                .header("authorization", bearer)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn identity_lookup_returns_resolved_fields() {
    let github = MockServer::start().await;
    let app = test_app(&github.uri(), &github.uri(), &github.uri());
    let identity = seed_identity(&app.state.identities);
    let bearer = bearer_for(&app.state.signer, identity.id);

    let response = router(app.state)
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("authorization", bearer)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["user"]["login"], "octocat");
    assert_eq!(body["user"]["githubId"], "42");
    assert_eq!(body["user"]["accessToken"], "gho_token");
}
