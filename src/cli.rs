use crate::config::RelaySettings;
use crate::github::GitHubClient;
use crate::load_config::load_config;
use crate::server::{create_router, start_server, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Relay clan rank snapshots into a GitHub repository.
#[derive(Parser, Debug)]
#[clap(
    name = "clanrank-relay",
    version,
    about = "Accept clan rank JSON over HTTP, commit it to GitHub and trigger the sync workflow"
)]
pub struct Cli {
    /// Optional YAML config file (no secrets; the token comes from GITHUB_PAT)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on, overrides PORT and the config file
    #[clap(long)]
    pub port: Option<u16>,
}

/// Async entrypoint for main() and integration tests. Serves until shutdown.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.trace_loaded();

    let client =
        GitHubClient::new(&config.github).context("Failed to construct GitHub client")?;
    let state = AppState::new(Arc::new(client), RelaySettings::from(&config));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    start_server(app, addr).await?;
    Ok(())
}
