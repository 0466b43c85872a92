use thiserror::Error;

use crate::git::SyncError;

/// Crate-level convenience error.
///
/// The core swallows remote-store faults by design; what remains here are
/// the failures a caller can actually act on: startup problems and local
/// filesystem faults while reading or writing the document.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("failed to read {path}: {source}")]
    ReadDocument {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteDocument {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
