//! XDG directory helpers for the local working copy location.

use std::path::PathBuf;

/// Base directory for persistent data (the cloned working copy lives here).
///
/// Uses `GITODO_DATA_DIR` if set, otherwise `$XDG_DATA_HOME/gitodo` or
/// `~/.local/share/gitodo`.
pub(crate) fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GITODO_DATA_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }

    std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local")
                .join("share")
        })
        .join("gitodo")
}

/// Default location of the local working copy.
pub(crate) fn default_repo_dir() -> PathBuf {
    data_dir().join("repo")
}
