//! Git integration module.
//!
//! Provides:
//! - `GitStore`, the adapter owning the local working copy
//! - outcome types for the swallowed-failure refresh/publish paths

pub mod error;
pub mod sync;

pub use error::SyncError;
pub use sync::{DOCUMENT_FILE, GitStore, PublishOutcome, REMOTE_TIMEOUT, RefreshOutcome};
