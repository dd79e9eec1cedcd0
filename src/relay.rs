//! Coordinating module for the render-commit-dispatch pipeline.
//!
//! One call per inbound upload. The commit decides the outcome; the workflow
//! dispatch that follows a successful commit is only recorded in the report
//! and the log.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::artifact::Artifact;
use crate::config::RelaySettings;
use crate::error::RelayError;
use crate::repository::{CommitReceipt, PutFileRequest, Repository, WorkflowDispatchRequest};

/// What happened to the follow-up workflow run.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Dispatched,
    Failed(String),
}

/// Result of one relayed upload.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReport {
    pub filename: String,
    pub path: String,
    pub commit: CommitReceipt,
    pub dispatch: DispatchOutcome,
}

pub async fn relay_upload<R>(
    repository: &R,
    settings: &RelaySettings,
    payload: &Value,
    now: DateTime<Utc>,
) -> Result<RelayReport, RelayError>
where
    R: Repository + ?Sized,
{
    let artifact = Artifact::from_payload(payload, &settings.upload_dir, now)?;
    info!(filename = %artifact.filename, path = %artifact.path, "[RELAY] Committing artifact");

    let commit = repository
        .put_file(PutFileRequest {
            path: artifact.path.clone(),
            content: artifact.content,
            message: artifact.commit_message,
            branch: settings.branch.clone(),
        })
        .await
        .map_err(|e| {
            error!(
                filename = %artifact.filename,
                error = ?e,
                "[RELAY][ERROR] Commit failed, skipping dispatch"
            );
            e
        })?;

    info!(path = %commit.path, status = commit.status, "[RELAY] Commit succeeded");

    let dispatch = match repository
        .dispatch_workflow(WorkflowDispatchRequest {
            workflow_file: settings.workflow_file.clone(),
            git_ref: settings.branch.clone(),
        })
        .await
    {
        Ok(()) => {
            info!(workflow = %settings.workflow_file, "[RELAY] Workflow dispatched");
            DispatchOutcome::Dispatched
        }
        Err(e) => {
            warn!(
                workflow = %settings.workflow_file,
                error = %e,
                "[RELAY][WARN] Workflow dispatch failed"
            );
            DispatchOutcome::Failed(e.to_string())
        }
    };

    Ok(RelayReport {
        filename: artifact.filename,
        path: artifact.path,
        commit,
        dispatch,
    })
}
