//! Remote store adapter over a git working copy.
//!
//! Lifecycle:
//! - `ensure_ready` clones the remote into the working copy once at startup
//! - `refresh` force-resets the working copy to the remote branch tip,
//!   discarding anything local that was never pushed
//! - `publish` stages the document, commits, and pushes
//!
//! refresh and publish never fail their caller: every fault is folded into
//! an outcome value and logged, and the working copy keeps its
//! last-known-good state. One hazard is preserved deliberately: a commit
//! whose push fails stays local, and the next hard reset discards it.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use git2::build::RepoBuilder;
use git2::{
    ErrorCode, FetchOptions, Oid, PushOptions, RemoteCallbacks, Repository, ResetType, Signature,
};

use super::error::SyncError;

/// Name of the single tracked document file.
pub const DOCUMENT_FILE: &str = "todo.md";

/// Upper bound for any single network-bound git operation.
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

const COMMITTER_NAME: &str = "gitodo";
const COMMITTER_EMAIL: &str = "gitodo@localhost";

/// Result of a best-effort refresh.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Working copy matches the remote branch tip.
    Fresh,
    /// The remote could not be reached or applied; the working copy keeps
    /// its last-known-good state.
    Stale(SyncError),
}

impl RefreshOutcome {
    pub fn is_fresh(&self) -> bool {
        matches!(self, RefreshOutcome::Fresh)
    }
}

/// Result of a best-effort publish.
#[derive(Debug)]
pub enum PublishOutcome {
    /// Commit created and pushed.
    Published,
    /// Index matched HEAD; nothing to commit.
    NoChanges,
    /// Commit created but the push failed. The commit exists only locally
    /// and the next refresh will discard it.
    LocalOnly(SyncError),
    /// Failed before a commit was created; no side effects.
    Failed(SyncError),
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published)
    }

    pub fn is_no_changes(&self) -> bool {
        matches!(self, PublishOutcome::NoChanges)
    }
}

/// Adapter owning the local working copy of the remote todo repository.
#[derive(Clone)]
pub struct GitStore {
    repo_dir: PathBuf,
    remote_url: String,
    token: Option<String>,
    branch: String,
}

impl GitStore {
    pub fn new(
        repo_dir: PathBuf,
        remote_url: String,
        token: Option<String>,
        branch: String,
    ) -> Self {
        Self {
            repo_dir,
            remote_url,
            token,
            branch,
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Path of the tracked document inside the working copy.
    pub fn document_path(&self) -> PathBuf {
        self.repo_dir.join(DOCUMENT_FILE)
    }

    /// Idempotent startup setup: clone the remote if the working copy does
    /// not exist yet, then pin the committer identity and the branch.
    ///
    /// Must complete once before any other operation; a failure here is
    /// fatal to startup. Not safe to call concurrently with itself.
    pub fn ensure_ready(&self) -> Result<(), SyncError> {
        if !self.repo_dir.join(".git").exists() {
            if let Some(parent) = self.repo_dir.parent() {
                fs::create_dir_all(parent)
                    .map_err(|err| SyncError::CreateDir(parent.to_path_buf(), err))?;
            }
            let deadline = Instant::now() + REMOTE_TIMEOUT;
            let mut options = FetchOptions::new();
            options.remote_callbacks(self.callbacks(deadline));
            RepoBuilder::new()
                .fetch_options(options)
                .clone(&self.authenticated_url(), &self.repo_dir)
                .map_err(|err| {
                    timeout_or(err, |err| SyncError::Clone {
                        url: self.remote_url.clone(),
                        source: err,
                    })
                })?;
            tracing::info!("cloned {} into {}", self.remote_url, self.repo_dir.display());
        }

        let repo = self.open()?;
        let mut config = repo.config()?;
        config.set_str("user.name", COMMITTER_NAME)?;
        config.set_str("user.email", COMMITTER_EMAIL)?;
        // The branch may be unborn when the remote is empty; HEAD still
        // points at it so the first commit lands in the right place.
        repo.set_head(&self.local_ref())?;
        Ok(())
    }

    /// Fetch the remote branch and hard-reset the working copy to its tip.
    ///
    /// Best-effort freshness: any failure keeps the last-known-good state.
    pub fn refresh(&self) -> RefreshOutcome {
        match self.try_refresh() {
            Ok(()) => RefreshOutcome::Fresh,
            Err(err) => {
                tracing::warn!("refresh failed, keeping local state: {err}");
                RefreshOutcome::Stale(err)
            }
        }
    }

    fn try_refresh(&self) -> Result<(), SyncError> {
        let repo = self.open()?;
        let deadline = Instant::now() + REMOTE_TIMEOUT;

        let mut remote = repo.find_remote("origin")?;
        let mut options = FetchOptions::new();
        options.remote_callbacks(self.callbacks(deadline));
        remote
            .fetch(&[self.branch.as_str()], Some(&mut options), None)
            .map_err(|err| timeout_or(err, SyncError::Fetch))?;

        let remote_oid = match repo.refname_to_id(&self.remote_ref()) {
            Ok(oid) => oid,
            // Remote branch not born yet; nothing to reset to.
            Err(_) => return Ok(()),
        };

        repo.reference(&self.local_ref(), remote_oid, true, "refresh")
            .map_err(SyncError::Reset)?;
        repo.set_head(&self.local_ref()).map_err(SyncError::Reset)?;
        let target = repo.find_object(remote_oid, None).map_err(SyncError::Reset)?;
        repo.reset(&target, ResetType::Hard, None)
            .map_err(SyncError::Reset)?;
        Ok(())
    }

    /// Stage the document and, if the index differs from HEAD, commit with
    /// `message` and push. Publishing with no changes is a cheap no-op.
    pub fn publish(&self, message: &str) -> PublishOutcome {
        let commit_oid = match self.commit_if_changed(message) {
            Ok(Some(oid)) => oid,
            Ok(None) => return PublishOutcome::NoChanges,
            Err(err) => {
                tracing::warn!("publish failed before commit: {err}");
                return PublishOutcome::Failed(err);
            }
        };

        match self.push() {
            Ok(()) => {
                tracing::info!("published {commit_oid}: {message}");
                PublishOutcome::Published
            }
            Err(err) => {
                tracing::warn!(
                    "push failed, commit {commit_oid} stays local and will be \
                     discarded by the next refresh: {err}"
                );
                PublishOutcome::LocalOnly(err)
            }
        }
    }

    fn commit_if_changed(&self, message: &str) -> Result<Option<Oid>, SyncError> {
        let repo = self.open()?;
        if !self.document_path().exists() {
            return Ok(None);
        }

        let mut index = repo.index()?;
        index
            .add_path(Path::new(DOCUMENT_FILE))
            .map_err(|err| SyncError::Stage(DOCUMENT_FILE.to_string(), err))?;
        index.write()?;
        let tree_id = index.write_tree()?;

        // HEAD is unborn until the first commit on an empty remote.
        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        if let Some(ref parent) = parent
            && parent.tree_id() == tree_id
        {
            return Ok(None);
        }

        let tree = repo.find_tree(tree_id)?;
        let signature =
            Signature::now(COMMITTER_NAME, COMMITTER_EMAIL).map_err(SyncError::Commit)?;
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(SyncError::Commit)?;
        Ok(Some(oid))
    }

    fn push(&self) -> Result<(), SyncError> {
        let repo = self.open()?;
        let deadline = Instant::now() + REMOTE_TIMEOUT;
        let mut remote = repo.find_remote("origin")?;
        let refspec = format!("{0}:{0}", self.local_ref());

        let rejection: RefCell<Option<String>> = RefCell::new(None);
        {
            let mut callbacks = self.callbacks(deadline);
            callbacks.push_update_reference(|_refname, status| {
                if let Some(message) = status {
                    *rejection.borrow_mut() = Some(message.to_string());
                }
                Ok(())
            });
            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);
            remote
                .push(&[refspec.as_str()], Some(&mut options))
                .map_err(|err| timeout_or(err, SyncError::Push))?;
        }

        if let Some(message) = rejection.into_inner() {
            return Err(SyncError::PushRejected { message });
        }
        Ok(())
    }

    fn open(&self) -> Result<Repository, SyncError> {
        Repository::open(&self.repo_dir)
            .map_err(|err| SyncError::OpenRepo(self.repo_dir.clone(), err))
    }

    fn local_ref(&self) -> String {
        format!("refs/heads/{}", self.branch)
    }

    fn remote_ref(&self) -> String {
        format!("refs/remotes/origin/{}", self.branch)
    }

    /// Clone URL with the access token embedded, when one is configured.
    fn authenticated_url(&self) -> String {
        match &self.token {
            Some(token) => match self.remote_url.strip_prefix("https://") {
                Some(rest) => format!("https://{token}@{rest}"),
                None => self.remote_url.clone(),
            },
            None => self.remote_url.clone(),
        }
    }

    fn callbacks<'a>(&self, deadline: Instant) -> RemoteCallbacks<'a> {
        let token = self.token.clone();
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, username_from_url, allowed| {
            if allowed.is_user_pass_plaintext()
                && let Some(ref token) = token
            {
                return git2::Cred::userpass_plaintext(
                    username_from_url.unwrap_or("x-access-token"),
                    token,
                );
            }
            if allowed.is_ssh_key()
                && let Some(user) = username_from_url
            {
                return git2::Cred::ssh_key_from_agent(user);
            }
            git2::Cred::default()
        });
        callbacks.transfer_progress(move |_progress| Instant::now() < deadline);
        callbacks
    }
}

/// Callback-driven cancellation surfaces as a user error code; everything
/// else keeps its phase-specific wrapper.
fn timeout_or(err: git2::Error, wrap: impl FnOnce(git2::Error) -> SyncError) -> SyncError {
    if err.code() == ErrorCode::User {
        SyncError::Timeout(REMOTE_TIMEOUT)
    } else {
        wrap(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(url: &str, token: Option<&str>) -> GitStore {
        GitStore::new(
            PathBuf::from("/tmp/unused"),
            url.to_string(),
            token.map(str::to_string),
            "main".to_string(),
        )
    }

    #[test]
    fn token_is_embedded_into_https_urls() {
        let store = store("https://example.com/todo.git", Some("s3cret"));
        assert_eq!(
            store.authenticated_url(),
            "https://s3cret@example.com/todo.git"
        );
    }

    #[test]
    fn non_https_urls_are_left_alone() {
        let store1 = store("git@example.com:todo.git", Some("s3cret"));
        assert_eq!(store1.authenticated_url(), "git@example.com:todo.git");

        let store2 = store("https://example.com/todo.git", None);
        assert_eq!(store2.authenticated_url(), "https://example.com/todo.git");
    }

    #[test]
    fn branch_refs_are_fully_qualified() {
        let store = store("https://example.com/todo.git", None);
        assert_eq!(store.local_ref(), "refs/heads/main");
        assert_eq!(store.remote_ref(), "refs/remotes/origin/main");
    }
}
