//! Naming and encoding of the file committed for each upload.
//!
//! Names carry a UTC timestamp with second resolution, so two uploads in the
//! same second map to the same path. Downstream jobs glob on
//! `clanrank_*.json`, so the scheme is kept as is.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::RelayError;

pub const FILENAME_PREFIX: &str = "clanrank_";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A rendered upload, ready to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Bare file name, e.g. `clanrank_20240102_030405.json`.
    pub filename: String,
    /// Path inside the repository, `<upload_dir>/<filename>`.
    pub path: String,
    /// Pretty-printed JSON, 4-space indent. Key order and number text are
    /// kept as received.
    pub content: Vec<u8>,
    pub commit_message: String,
}

impl Artifact {
    pub fn from_payload(
        payload: &Value,
        upload_dir: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, RelayError> {
        let filename = artifact_filename(now);
        let path = artifact_path(upload_dir, &filename);
        let content = render_pretty(payload)?;
        let commit_message = format!("Upload clanrank data {filename}");

        tracing::debug!(
            filename = %filename,
            path = %path,
            bytes = content.len(),
            "Rendered artifact"
        );

        Ok(Artifact {
            filename,
            path,
            content,
            commit_message,
        })
    }
}

pub fn artifact_filename(now: DateTime<Utc>) -> String {
    format!("{FILENAME_PREFIX}{}.json", now.format(TIMESTAMP_FORMAT))
}

pub fn artifact_path(upload_dir: &str, filename: &str) -> String {
    let dir = upload_dir.trim_matches('/');
    if dir.is_empty() {
        filename.to_string()
    } else {
        format!("{dir}/{filename}")
    }
}

fn render_pretty(payload: &Value) -> Result<Vec<u8>, RelayError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    payload.serialize(&mut ser).map_err(RelayError::internal)?;
    Ok(buf)
}
