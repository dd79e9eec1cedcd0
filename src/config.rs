use tracing::{debug, info};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_OWNER: &str = "PinkyOSRS";
pub const DEFAULT_REPO: &str = "osrs-clan-rank-sync";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_WORKFLOW: &str = "clanrank.yml";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_PORT: u16 = 3000;

/// Everything the relay needs, resolved once at startup.
#[derive(Clone)]
pub struct RelayConfig {
    pub github: GitHubConfig,
    /// Directory inside the repository that receives uploads.
    pub upload_dir: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct GitHubConfig {
    /// Personal access token. Never logged.
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub workflow_file: String,
    pub api_base_url: String,
}

impl RelayConfig {
    pub fn trace_loaded(&self) {
        info!(
            owner = %self.github.owner,
            repo = %self.github.repo,
            branch = %self.github.branch,
            workflow = %self.github.workflow_file,
            upload_dir = %self.upload_dir,
            port = self.port,
            "Loaded RelayConfig"
        );
        debug!(?self, "RelayConfig loaded (full debug)");
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("workflow_file", &self.workflow_file)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("github", &self.github)
            .field("upload_dir", &self.upload_dir)
            .field("port", &self.port)
            .finish()
    }
}

/// Settings the request pipeline reads; the subset of [`RelayConfig`] that is
/// not the client's business.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub branch: String,
    pub workflow_file: String,
    pub upload_dir: String,
}

impl From<&RelayConfig> for RelaySettings {
    fn from(config: &RelayConfig) -> Self {
        RelaySettings {
            branch: config.github.branch.clone(),
            workflow_file: config.github.workflow_file.clone(),
            upload_dir: config.upload_dir.clone(),
        }
    }
}
