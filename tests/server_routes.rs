//! Router tests: drive the axum app with `oneshot` against a mocked repository.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use clanrank_relay::config::RelaySettings;
use clanrank_relay::repository::{
    CommitReceipt, MockRepository, PutFileRequest, Repository, WorkflowDispatchRequest,
};
use clanrank_relay::server::{create_router, AppState};
use clanrank_relay::RelayError;
use regex::Regex;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(repository: MockRepository) -> Router {
    let settings = RelaySettings {
        branch: "main".to_string(),
        workflow_file: "clanrank.yml".to_string(),
        upload_dir: "uploads".to_string(),
    };
    create_router(AppState::new(Arc::new(repository), settings))
}

fn post_clanrank(content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/clanrank");
    if let Some(ct) = content_type {
        builder = builder.header("Content-Type", ct);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response should be valid JSON")
}

fn untouched_repository() -> MockRepository {
    let mut repository = MockRepository::new();
    repository.expect_put_file().never();
    repository.expect_dispatch_workflow().never();
    repository
}

fn accepting_repository() -> MockRepository {
    let mut repository = MockRepository::new();
    repository.expect_put_file().times(1).returning(|req| {
        Ok(CommitReceipt {
            path: req.path,
            status: 201,
        })
    });
    repository
        .expect_dispatch_workflow()
        .times(1)
        .returning(|_| Ok(()));
    repository
}

#[tokio::test]
async fn home_reports_liveness() {
    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app(untouched_repository()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "status": "ok", "message": "Uploader is running. Use POST /clanrank" })
    );
}

#[tokio::test]
async fn upload_returns_timestamped_filename() {
    let response = app(accepting_repository())
        .oneshot(post_clanrank(
            Some("application/json"),
            r#"{"clan":"Pinky","members":[{"name":"Zezima","rank":"Owner"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = json_body(response).await;
    assert_eq!(body["status"], "success");
    let filename = body["filename"].as_str().expect("filename should be a string");
    let pattern = Regex::new(r"^clanrank_\d{8}_\d{6}\.json$").unwrap();
    assert!(pattern.is_match(filename), "unexpected filename {filename}");
}

#[tokio::test]
async fn upload_accepts_json_with_charset() {
    let response = app(accepting_repository())
        .oneshot(post_clanrank(Some("application/json; charset=utf-8"), "[1, 2, 3]"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_json_content_type_is_rejected_without_outbound_calls() {
    for content_type in [Some("text/plain"), Some("application/x-www-form-urlencoded"), None] {
        let response = app(untouched_repository())
            .oneshot(post_clanrank(content_type, r#"{"clan":"Pinky"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "content type {content_type:?}");
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Content-Type must be application/json" })
        );
    }
}

#[tokio::test]
async fn rejected_commit_surfaces_github_body() {
    let github_body = r#"{"message":"Invalid request.\n\n\"sha\" wasn't supplied.","status":"422"}"#;

    let mut repository = MockRepository::new();
    repository.expect_put_file().times(1).returning(move |_| {
        Err(RelayError::UpstreamCommit {
            status: Some(422),
            details: github_body.to_string(),
        })
    });
    repository.expect_dispatch_workflow().never();

    let response = app(repository)
        .oneshot(post_clanrank(Some("application/json"), r#"{"clan":"Pinky"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "GitHub API error", "details": github_body })
    );
}

#[tokio::test]
async fn dispatch_transport_error_still_returns_success() {
    let mut repository = MockRepository::new();
    repository.expect_put_file().times(1).returning(|req| {
        Ok(CommitReceipt {
            path: req.path,
            status: 201,
        })
    });
    repository.expect_dispatch_workflow().times(1).returning(|_| {
        Err(RelayError::UpstreamDispatch {
            status: None,
            details: "error sending request: connection refused".to_string(),
        })
    });

    let response = app(repository)
        .oneshot(post_clanrank(Some("application/json"), r#"{"clan":"Pinky"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "success");
}

#[tokio::test]
async fn malformed_json_is_an_internal_error() {
    let response = app(untouched_repository())
        .oneshot(post_clanrank(Some("application/json"), "{\"clan\": "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    let message = body["error"].as_str().expect("error should be a string");
    assert!(!message.is_empty());
    assert!(body.get("details").is_none());
}

struct PanickingRepository;

#[async_trait]
impl Repository for PanickingRepository {
    async fn put_file(&self, _req: PutFileRequest) -> Result<CommitReceipt, RelayError> {
        panic!("repository exploded")
    }

    async fn dispatch_workflow(&self, _req: WorkflowDispatchRequest) -> Result<(), RelayError> {
        Ok(())
    }
}

#[tokio::test]
async fn panics_in_the_repository_become_internal_errors() {
    let settings = RelaySettings {
        branch: "main".to_string(),
        workflow_file: "clanrank.yml".to_string(),
        upload_dir: "uploads".to_string(),
    };
    let app = create_router(AppState::new(Arc::new(PanickingRepository), settings));

    let response = app
        .oneshot(post_clanrank(Some("application/json"), r#"{"clan":"Pinky"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "repository exploded" })
    );
}
