//! # GitHub client
//!
//! Implements [`Repository`] against the GitHub REST API:
//!
//! - `PUT /repos/{owner}/{repo}/contents/{path}` to create or update a file
//! - `POST /repos/{owner}/{repo}/actions/workflows/{workflow}/dispatches` to
//!   start a workflow run
//!
//! The client is built once from [`GitHubConfig`] and shared between requests.
//! Every call carries the configured token as a bearer credential. No call is
//! retried.

use async_trait::async_trait;
use base64::Engine;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::config::GitHubConfig;
use crate::error::RelayError;
use crate::repository::{CommitReceipt, PutFileRequest, Repository, WorkflowDispatchRequest};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("clanrank-relay/", env!("CARGO_PKG_VERSION"));

/// Payload previews in the log are cut to this many characters.
pub const PREVIEW_CHARS: usize = 400;

pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to build HTTP client"))?;

        tracing::info!(
            base_url = %config.api_base_url,
            owner = %config.owner,
            repo = %config.repo,
            token_set = !config.token.is_empty(),
            "Initialized GitHubClient"
        );

        Ok(GitHubClient {
            http,
            token: config.token.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
        })
    }

    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    pub fn dispatch_url(&self, workflow_file: &str) -> String {
        format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.base_url, self.owner, self.repo, workflow_file
        )
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

#[async_trait]
impl Repository for GitHubClient {
    async fn put_file(&self, req: PutFileRequest) -> Result<CommitReceipt, RelayError> {
        let url = self.contents_url(&req.path);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&req.content);
        let payload = json!({
            "message": req.message,
            "content": encoded,
            "branch": req.branch,
        });

        tracing::info!(url = %url, "Uploading to GitHub");
        tracing::info!(payload = %payload_preview(&payload), "Payload (truncated)");

        let response = match self.authorized(self.http.put(&url)).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = ?e, url = %url, "Transport error writing file to GitHub");
                return Err(RelayError::UpstreamCommit {
                    status: None,
                    details: e.to_string(),
                });
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!(
                error = ?e,
                status = status.as_u16(),
                "Failed to read GitHub response body"
            );
            RelayError::UpstreamCommit {
                status: Some(status.as_u16()),
                details: e.to_string(),
            }
        })?;

        tracing::info!(status = status.as_u16(), "GitHub status");
        tracing::info!(response = %body, "GitHub response");

        if status == StatusCode::OK || status == StatusCode::CREATED {
            Ok(CommitReceipt {
                path: req.path,
                status: status.as_u16(),
            })
        } else {
            Err(RelayError::UpstreamCommit {
                status: Some(status.as_u16()),
                details: body,
            })
        }
    }

    async fn dispatch_workflow(&self, req: WorkflowDispatchRequest) -> Result<(), RelayError> {
        let url = self.dispatch_url(&req.workflow_file);
        let payload = json!({ "ref": req.git_ref });

        tracing::info!(url = %url, git_ref = %req.git_ref, "Dispatching workflow");

        let response = self
            .authorized(self.http.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::UpstreamDispatch {
                status: None,
                details: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(
                status = status.as_u16(),
                workflow = %req.workflow_file,
                "Workflow dispatched"
            );
            return Ok(());
        }

        let details = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(
                    error = ?e,
                    status = status.as_u16(),
                    "Failed to read workflow dispatch response body"
                );
                format!("failed to read response body: {e}")
            }
        };
        tracing::warn!(
            status = status.as_u16(),
            workflow = %req.workflow_file,
            response = %details,
            "Workflow dispatch rejected"
        );
        Err(RelayError::UpstreamDispatch {
            status: Some(status.as_u16()),
            details,
        })
    }
}

/// Pretty JSON of `payload`, cut to [`PREVIEW_CHARS`] characters.
pub fn payload_preview(payload: &Value) -> String {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_default();
    rendered.chars().take(PREVIEW_CHARS).collect()
}
