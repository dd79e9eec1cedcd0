//! Error kinds for the relay pipeline and their HTTP mapping.
//!
//! Every failure a request can hit is one of four kinds. The HTTP layer turns
//! them into a status code and a small JSON body; nothing else in the crate
//! builds error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Message returned when the inbound body is not declared as JSON.
pub const CONTENT_TYPE_ERROR: &str = "Content-Type must be application/json";

/// Top-level error used on both sides of the relay (inbound and GitHub).
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The caller sent something we refuse to look at.
    #[error("{0}")]
    Input(String),

    /// GitHub refused the content write, or we never reached it.
    ///
    /// `status` is `None` for transport failures; `details` then holds the
    /// transport error text instead of a response body.
    #[error("GitHub API error")]
    UpstreamCommit {
        status: Option<u16>,
        details: String,
    },

    /// Workflow dispatch failed. Only logged by the pipeline.
    #[error("workflow dispatch failed: {details}")]
    UpstreamDispatch {
        status: Option<u16>,
        details: String,
    },

    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        RelayError::Internal(err.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Input(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamCommit { .. }
            | RelayError::UpstreamDispatch { .. }
            | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            RelayError::Input(_) => {
                tracing::warn!(error = %self, "Rejected inbound request");
                json!({ "error": self.to_string() })
            }
            RelayError::UpstreamCommit { status, details } => {
                tracing::error!(
                    upstream_status = ?status,
                    details = %details,
                    "GitHub commit failed"
                );
                json!({ "error": self.to_string(), "details": details })
            }
            RelayError::UpstreamDispatch { .. } | RelayError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                json!({ "error": self.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
