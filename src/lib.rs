#![doc = "clanrank-relay: accept clan rank snapshots over HTTP and commit them to GitHub."]

//! The crate is a single linear pipeline. An inbound `POST /clanrank` is
//! checked and parsed by [`server`], rendered into an [`artifact::Artifact`],
//! written to the repository and followed by a workflow dispatch in [`relay`].
//! [`repository::Repository`] is the seam between the pipeline and GitHub;
//! [`github::GitHubClient`] is the production implementation.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod load_config;
pub mod relay;
pub mod repository;
pub mod server;

pub use cli::{run, Cli};
pub use error::RelayError;
