#![allow(dead_code)]

use std::path::PathBuf;

use git2::{Repository, Signature};
use tempfile::TempDir;

use gitodo::git::{DOCUMENT_FILE, GitStore};

/// A bare "origin" repository plus a working-copy location, both inside one
/// temp dir. The bare repo stands in for the remote endpoint, so the whole
/// clone/fetch/push cycle runs without a network.
pub struct RemoteFixture {
    _temp: TempDir,
    pub remote_dir: PathBuf,
    pub work_dir: PathBuf,
}

impl RemoteFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("tempdir");
        let remote_dir = temp.path().join("remote.git");
        let work_dir = temp.path().join("work");
        let remote = Repository::init_bare(&remote_dir).expect("git init --bare");
        remote.set_head("refs/heads/main").expect("set remote HEAD");
        Self {
            _temp: temp,
            remote_dir,
            work_dir,
        }
    }

    pub fn git_store(&self) -> GitStore {
        GitStore::new(
            self.work_dir.clone(),
            self.remote_dir
                .to_str()
                .expect("remote dir path is utf8")
                .to_string(),
            None,
            "main".to_string(),
        )
    }

    /// Commit a document revision directly into the bare remote.
    pub fn seed_document(&self, content: &str) {
        let repo = Repository::open_bare(&self.remote_dir).expect("open remote");
        let blob = repo.blob(content.as_bytes()).expect("write blob");
        let mut builder = repo.treebuilder(None).expect("treebuilder");
        builder
            .insert(DOCUMENT_FILE, blob, 0o100644)
            .expect("tree insert");
        let tree_id = builder.write().expect("tree write");
        let tree = repo.find_tree(tree_id).expect("find tree");
        let sig = Signature::now("Test", "test@test.com").expect("signature");
        let parent = repo
            .refname_to_id("refs/heads/main")
            .ok()
            .and_then(|oid| repo.find_commit(oid).ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("refs/heads/main"), &sig, &sig, "seed", &tree, &parents)
            .expect("commit");
    }

    /// Document content at the remote branch tip, if any.
    pub fn remote_document(&self) -> Option<String> {
        let repo = Repository::open_bare(&self.remote_dir).ok()?;
        let oid = repo.refname_to_id("refs/heads/main").ok()?;
        let commit = repo.find_commit(oid).ok()?;
        let tree = commit.tree().ok()?;
        let entry = tree.get_name(DOCUMENT_FILE)?;
        let blob = repo.find_blob(entry.id()).ok()?;
        Some(String::from_utf8_lossy(blob.content()).into_owned())
    }

    /// Number of commits reachable from the remote branch tip.
    pub fn remote_commit_count(&self) -> usize {
        let repo = match Repository::open_bare(&self.remote_dir) {
            Ok(repo) => repo,
            Err(_) => return 0,
        };
        let oid = match repo.refname_to_id("refs/heads/main") {
            Ok(oid) => oid,
            Err(_) => return 0,
        };
        let mut walk = repo.revwalk().expect("revwalk");
        walk.push(oid).expect("revwalk push");
        walk.count()
    }

    /// Summary line of the latest commit on the remote branch.
    pub fn remote_head_summary(&self) -> Option<String> {
        let repo = Repository::open_bare(&self.remote_dir).ok()?;
        let oid = repo.refname_to_id("refs/heads/main").ok()?;
        let commit = repo.find_commit(oid).ok()?;
        commit.summary().map(str::to_string)
    }

    /// Create a commit in the working copy without pushing it, as if a
    /// publish had lost its push.
    pub fn commit_locally(&self, content: &str, message: &str) {
        let repo = Repository::open(&self.work_dir).expect("open work repo");
        std::fs::write(self.work_dir.join(DOCUMENT_FILE), content).expect("write document");
        let mut index = repo.index().expect("index");
        index
            .add_path(std::path::Path::new(DOCUMENT_FILE))
            .expect("stage document");
        index.write().expect("index write");
        let tree_id = index.write_tree().expect("write tree");
        let tree = repo.find_tree(tree_id).expect("find tree");
        let sig = Signature::now("Test", "test@test.com").expect("signature");
        let parent = repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit");
    }

    /// Tip oid of the working copy's branch, as a hex string.
    pub fn local_head(&self) -> Option<String> {
        let repo = Repository::open(&self.work_dir).ok()?;
        let oid = repo.refname_to_id("refs/heads/main").ok()?;
        Some(oid.to_string())
    }

    /// Tip oid of the remote branch, as a hex string.
    pub fn remote_head(&self) -> Option<String> {
        let repo = Repository::open_bare(&self.remote_dir).ok()?;
        let oid = repo.refname_to_id("refs/heads/main").ok()?;
        Some(oid.to_string())
    }
}
