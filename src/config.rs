//! Environment-driven configuration.

use std::path::PathBuf;

use uuid::Uuid;

use crate::paths;

/// Runtime configuration for the serving process.
///
/// Everything has a default except the remote URL, which startup checks
/// before touching the working copy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Local working-copy directory.
    pub repo_dir: PathBuf,
    /// Remote repository URL (https or ssh).
    pub remote_url: Option<String>,
    /// Access credential embedded into the clone URL when set.
    pub token: Option<String>,
    /// Remote default branch.
    pub branch: String,
    /// Serving port.
    pub port: u16,
    /// Login credential pair.
    pub auth_user: String,
    pub auth_pass: String,
    /// Session-signing secret. Random per process unless pinned, so
    /// sessions do not survive a restart by default.
    pub session_secret: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_dir: paths::default_repo_dir(),
            remote_url: None,
            token: None,
            branch: "main".to_string(),
            port: 3000,
            auth_user: "admin".to_string(),
            auth_pass: "admin".to_string(),
            session_secret: Uuid::new_v4().simple().to_string(),
        }
    }
}

/// Defaults layered with env overrides.
pub fn load() -> Config {
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    config
}

pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

fn apply_overrides(config: &mut Config, get: impl Fn(&str) -> Option<String>) {
    if let Some(raw) = get("GITODO_REPO_DIR") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.repo_dir = PathBuf::from(trimmed);
        }
    }

    if let Some(raw) = get("GITODO_REMOTE_URL") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.remote_url = Some(trimmed.to_string());
        }
    }

    if let Some(raw) = get("GITODO_TOKEN") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.token = Some(trimmed.to_string());
        }
    }

    if let Some(raw) = get("GITODO_BRANCH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.branch = trimmed.to_string();
        }
    }

    if let Some(raw) = get("GITODO_PORT") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(err) => {
                    tracing::warn!("invalid GITODO_PORT, ignoring: {err}");
                }
            }
        }
    }

    if let Some(raw) = get("GITODO_AUTH_USER") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.auth_user = trimmed.to_string();
        }
    }

    if let Some(raw) = get("GITODO_AUTH_PASS") {
        if !raw.is_empty() {
            config.auth_pass = raw;
        }
    }

    if let Some(raw) = get("GITODO_SESSION_SECRET") {
        if !raw.trim().is_empty() {
            config.session_secret = raw;
        }
    }
}
