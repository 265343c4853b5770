//! Unit tests for pull request publishing.

use mockall::Sequence;

use super::{GeneratedTestFile, PublishError, PullRequestDraft, PullRequestPublisher};
use crate::github::{CreatedPullRequest, GatewayError, MockRepositoryContentGateway};
use crate::github::RepositoryLocator;

fn locator() -> RepositoryLocator {
    RepositoryLocator::from_owner_repo("octo-org", "demo").expect("locator should build")
}

fn draft_with_files(paths: &[&str]) -> PullRequestDraft {
    PullRequestDraft {
        base_branch: "main".to_owned(),
        branch_name: "testsmith/generated".to_owned(),
        title: "Add generated tests".to_owned(),
        body: "Generated by testsmith".to_owned(),
        files: paths
            .iter()
            .map(|path| GeneratedTestFile {
                path: (*path).to_owned(),
                code: format!("// test for {path}"),
            })
            .collect(),
    }
}

#[tokio::test]
async fn publish_commits_every_file_then_opens_pull_request() {
    let mut gateway = MockRepositoryContentGateway::new();
    let mut order = Sequence::new();

    gateway
        .expect_branch_head()
        .times(1)
        .in_sequence(&mut order)
        .withf(|_, branch| branch == "main")
        .returning(|_, _| Ok("base-sha".to_owned()));
    gateway
        .expect_create_branch()
        .times(1)
        .in_sequence(&mut order)
        .withf(|_, branch, sha| branch == "testsmith/generated" && sha == "base-sha")
        .returning(|_, _, _| Ok(()));
    gateway
        .expect_commit_file()
        .times(1)
        .in_sequence(&mut order)
        .withf(|_, branch, path, _, message| {
            branch == "testsmith/generated"
                && path == "tests/a.spec.js"
                && message == "chore: add generated test tests/a.spec.js"
        })
        .returning(|_, _, _, _, _| Ok(()));
    gateway
        .expect_commit_file()
        .times(1)
        .in_sequence(&mut order)
        .withf(|_, _, path, _, _| path == "tests/b.spec.js")
        .returning(|_, _, _, _, _| Ok(()));
    gateway
        .expect_open_pull_request()
        .times(1)
        .in_sequence(&mut order)
        .withf(|_, title, head, base, _| {
            title == "Add generated tests" && head == "testsmith/generated" && base == "main"
        })
        .returning(|_, _, _, _, _| {
            Ok(CreatedPullRequest {
                number: 7,
                html_url: Some("https://github.com/octo-org/demo/pull/7".to_owned()),
            })
        });

    let publisher = PullRequestPublisher::new(&gateway);
    let created = publisher
        .publish(
            &locator(),
            &draft_with_files(&["tests/a.spec.js", "tests/b.spec.js"]),
        )
        .await
        .expect("publish should succeed");

    assert_eq!(created.number, 7);
}

#[tokio::test]
async fn second_commit_failure_aborts_remaining_commits_without_rollback() {
    let mut gateway = MockRepositoryContentGateway::new();
    let mut order = Sequence::new();

    gateway
        .expect_branch_head()
        .times(1)
        .in_sequence(&mut order)
        .returning(|_, _| Ok("base-sha".to_owned()));
    gateway
        .expect_create_branch()
        .times(1)
        .in_sequence(&mut order)
        .returning(|_, _, _| Ok(()));
    gateway
        .expect_commit_file()
        .times(1)
        .in_sequence(&mut order)
        .withf(|_, _, path, _, _| path == "tests/a.spec.js")
        .returning(|_, _, _, _, _| Ok(()));
    gateway
        .expect_commit_file()
        .times(1)
        .in_sequence(&mut order)
        .withf(|_, _, path, _, _| path == "tests/b.spec.js")
        .returning(|_, _, _, _, _| {
            Err(GatewayError::Api {
                message: "commit file failed with status 409: conflict".to_owned(),
            })
        });
    // The third file is never committed, no branch deletion is attempted, and
    // no pull request is opened.
    gateway.expect_open_pull_request().never();

    let publisher = PullRequestPublisher::new(&gateway);
    let error = publisher
        .publish(
            &locator(),
            &draft_with_files(&["tests/a.spec.js", "tests/b.spec.js", "tests/c.spec.js"]),
        )
        .await
        .expect_err("publish should fail");

    let PublishError::FileCommitFailed { path, message } = &error else {
        panic!("expected FileCommitFailed, got {error:?}");
    };
    assert_eq!(path, "tests/b.spec.js");
    assert!(message.contains("conflict"));
    assert_eq!(error.code(), "FILE_COMMIT_FAILED");
}

#[tokio::test]
async fn existing_branch_maps_to_branch_create_failed() {
    let mut gateway = MockRepositoryContentGateway::new();

    gateway
        .expect_branch_head()
        .times(1)
        .returning(|_, _| Ok("base-sha".to_owned()));
    gateway.expect_create_branch().times(1).returning(|_, _, _| {
        Err(GatewayError::Api {
            message: "create branch failed with status 422: Reference already exists".to_owned(),
        })
    });
    gateway.expect_commit_file().never();

    let publisher = PullRequestPublisher::new(&gateway);
    let error = publisher
        .publish(&locator(), &draft_with_files(&["tests/a.spec.js"]))
        .await
        .expect_err("publish should fail");

    assert_eq!(error.code(), "BRANCH_CREATE_FAILED");
}

#[tokio::test]
async fn missing_base_branch_maps_to_branch_create_failed() {
    let mut gateway = MockRepositoryContentGateway::new();

    gateway.expect_branch_head().times(1).returning(|_, _| {
        Err(GatewayError::Api {
            message: "resolve branch head failed with status 404: Not Found".to_owned(),
        })
    });
    gateway.expect_create_branch().never();

    let publisher = PullRequestPublisher::new(&gateway);
    let error = publisher
        .publish(&locator(), &draft_with_files(&["tests/a.spec.js"]))
        .await
        .expect_err("publish should fail");

    assert!(matches!(error, PublishError::BranchCreateFailed { .. }));
}

#[tokio::test]
async fn upstream_pr_rejection_maps_to_pr_create_failed() {
    let mut gateway = MockRepositoryContentGateway::new();

    gateway
        .expect_branch_head()
        .returning(|_, _| Ok("base-sha".to_owned()));
    gateway.expect_create_branch().returning(|_, _, _| Ok(()));
    gateway
        .expect_commit_file()
        .returning(|_, _, _, _, _| Ok(()));
    gateway.expect_open_pull_request().times(1).returning(|_, _, _, _, _| {
        Err(GatewayError::Api {
            message: "open pull request failed with status 422: No commits between branches"
                .to_owned(),
        })
    });

    let publisher = PullRequestPublisher::new(&gateway);
    let error = publisher
        .publish(&locator(), &draft_with_files(&["tests/a.spec.js"]))
        .await
        .expect_err("publish should fail");

    assert_eq!(error.code(), "PR_CREATE_FAILED");
}
