//! Remote store error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur against the working copy or the remote.
///
/// Only `ensure_ready` propagates these to a caller; refresh and publish
/// fold them into their outcome values.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SyncError {
    #[error("failed to create working copy directory {0}: {1}")]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("failed to clone {url}: {source}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("failed to open repository at {0}: {1}")]
    OpenRepo(PathBuf, #[source] git2::Error),

    #[error("failed to fetch from remote: {0}")]
    Fetch(#[source] git2::Error),

    #[error("failed to reset working copy to remote tip: {0}")]
    Reset(#[source] git2::Error),

    #[error("failed to stage {0}: {1}")]
    Stage(String, #[source] git2::Error),

    #[error("failed to create commit: {0}")]
    Commit(#[source] git2::Error),

    #[error("failed to push: {0}")]
    Push(#[source] git2::Error),

    #[error("push rejected by remote: {message}")]
    PushRejected { message: String },

    #[error("remote operation exceeded {0:?}")]
    Timeout(Duration),

    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),
}
