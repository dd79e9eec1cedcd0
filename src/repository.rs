//! # repository: interface to the remote repository service
//!
//! The relay needs exactly two things from the repository host: write a file
//! on a branch, and kick off a workflow. [`Repository`] captures those two
//! calls so the pipeline can run against the real GitHub client or a mock.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockRepository` is exported with the
//!   default `test-export-mocks` feature so integration tests can use it.
//!
//! ## Error contract
//! - `put_file` returns [`RelayError::UpstreamCommit`] for both rejected writes
//!   and transport failures.
//! - `dispatch_workflow` returns [`RelayError::UpstreamDispatch`].

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::RelayError;

/// A create-or-update request for a single file.
#[derive(Debug, Clone, PartialEq)]
pub struct PutFileRequest {
    /// Path inside the repository, e.g. `uploads/clanrank_20240102_030405.json`.
    pub path: String,
    /// Raw file bytes. The client takes care of base64 encoding.
    pub content: Vec<u8>,
    pub message: String,
    pub branch: String,
}

/// What a successful write looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReceipt {
    pub path: String,
    /// 201 when the file was created, 200 when it was updated.
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDispatchRequest {
    /// Workflow file name or numeric id, e.g. `clanrank.yml`.
    pub workflow_file: String,
    /// Branch or tag the workflow runs on.
    pub git_ref: String,
}

/// Trait for writing artifacts and triggering workflows on the repository host.
/// The trait is `Send` + `Sync` so it can live in shared router state.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Repository: Send + Sync {
    /// Create or update a file on a branch. A single attempt, no retry.
    async fn put_file(&self, req: PutFileRequest) -> Result<CommitReceipt, RelayError>;

    /// Trigger a `workflow_dispatch` run.
    async fn dispatch_workflow(&self, req: WorkflowDispatchRequest) -> Result<(), RelayError>;
}
