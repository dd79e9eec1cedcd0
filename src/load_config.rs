//! `load_config` module: builds the [`RelayConfig`] from defaults, an optional
//! static YAML file (no secrets) and the process environment.
//!
//! Precedence, lowest first: built-in defaults, YAML file, environment. The
//! CLI may still override the port afterwards.
//!
//! Recognised environment variables: `GITHUB_PAT` (required), `GITHUB_OWNER`,
//! `GITHUB_REPO`, `GITHUB_BRANCH`, `GITHUB_WORKFLOW`, `GITHUB_API_URL`,
//! `UPLOAD_DIR`, `PORT`. Empty values count as unset.

use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::config::{
    GitHubConfig, RelayConfig, DEFAULT_API_BASE_URL, DEFAULT_BRANCH, DEFAULT_OWNER, DEFAULT_PORT,
    DEFAULT_REPO, DEFAULT_UPLOAD_DIR, DEFAULT_WORKFLOW,
};

pub const TOKEN_ENV: &str = "GITHUB_PAT";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StaticConfig {
    #[serde(default)]
    github: GitHubSection,
    upload_dir: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GitHubSection {
    owner: Option<String>,
    repo: Option<String>,
    branch: Option<String>,
    workflow_file: Option<String>,
    api_base_url: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> Result<RelayConfig> {
    let static_conf = match path {
        Some(path) => read_static_config(path)?,
        None => {
            info!("No config file given, using defaults and environment");
            StaticConfig::default()
        }
    };

    let token = match env_var(TOKEN_ENV) {
        Some(token) => {
            info!("{TOKEN_ENV} found in env");
            token
        }
        None => {
            error!("{TOKEN_ENV} environment variable not set");
            anyhow::bail!("{TOKEN_ENV} environment variable not set");
        }
    };

    let port = match env_var("PORT") {
        Some(raw) => match raw.parse::<u16>() {
            Ok(port) => port,
            Err(e) => {
                error!(error = ?e, var = %raw, "PORT must be a valid port number");
                return Err(anyhow::anyhow!("PORT must be a valid port number: {e}"));
            }
        },
        None => static_conf.port.unwrap_or(DEFAULT_PORT),
    };

    let section = static_conf.github;
    let github = GitHubConfig {
        token,
        owner: pick("GITHUB_OWNER", section.owner, DEFAULT_OWNER),
        repo: pick("GITHUB_REPO", section.repo, DEFAULT_REPO),
        branch: pick("GITHUB_BRANCH", section.branch, DEFAULT_BRANCH),
        workflow_file: pick("GITHUB_WORKFLOW", section.workflow_file, DEFAULT_WORKFLOW),
        api_base_url: pick("GITHUB_API_URL", section.api_base_url, DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_string(),
    };

    let config = RelayConfig {
        github,
        upload_dir: pick("UPLOAD_DIR", static_conf.upload_dir, DEFAULT_UPLOAD_DIR),
        port,
    };

    info!(
        owner = %config.github.owner,
        repo = %config.github.repo,
        port = config.port,
        "Config loaded and merged successfully"
    );

    Ok(config)
}

fn read_static_config(path: &Path) -> Result<StaticConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path,
                e
            ));
        }
    };

    // An empty file deserializes to `null`, which is as good as no file.
    if content.trim().is_empty() {
        return Ok(StaticConfig::default());
    }

    match serde_yaml::from_str(&content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn pick(key: &str, from_file: Option<String>, default: &str) -> String {
    env_var(key)
        .or(from_file)
        .unwrap_or_else(|| default.to_string())
}
