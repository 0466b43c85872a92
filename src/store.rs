//! Todo store orchestration.
//!
//! Every operation runs the same pipeline: refresh the working copy from
//! the remote, parse the document, apply a pure in-memory transformation,
//! then (for mutations) serialize, write locally, and publish under a
//! derived commit message. The document is never cached between requests.
//!
//! Remote-store faults never surface here: refresh and publish swallow
//! them, so a caller always gets the resulting document back. Addressing
//! errors (unknown section, out-of-range index) are silent no-ops that
//! still attempt a publish, which the adapter turns into a cheap no-op
//! when nothing actually changed.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use crate::doc::{Document, markdown};
use crate::git::GitStore;
use crate::{Error, Result};

/// Commit message used when a mutation did not apply. It only ever reaches
/// a commit when the working copy already held unpublished local edits.
const NOOP_MESSAGE: &str = "Sync";

pub struct TodoStore {
    git: GitStore,
    /// Serializes the whole refresh, parse, mutate, publish sequence.
    /// Without it, two concurrent mutations race read-modify-write and the
    /// later publish silently discards the earlier change.
    op_lock: Mutex<()>,
}

impl TodoStore {
    pub fn new(git: GitStore) -> Self {
        Self {
            git,
            op_lock: Mutex::new(()),
        }
    }

    /// Current document, refreshed from the remote first.
    pub fn list(&self) -> Result<Document> {
        let _guard = self.op_lock.lock().expect("op lock poisoned");
        let _ = self.git.refresh();
        self.load()
    }

    /// Refresh only. Used by the sync endpoints and the webhook.
    pub fn refresh(&self) {
        let _guard = self.op_lock.lock().expect("op lock poisoned");
        let _ = self.git.refresh();
    }

    pub fn add_item(&self, section: &str, text: &str) -> Result<Document> {
        self.mutate(|doc| doc.add_item(section, text))
    }

    pub fn toggle_item(&self, section: &str, index: usize) -> Result<Document> {
        self.mutate(|doc| doc.toggle_item(section, index))
    }

    pub fn edit_item(&self, section: &str, index: usize, text: &str) -> Result<Document> {
        self.mutate(|doc| doc.edit_item(section, index, text))
    }

    pub fn remove_item(&self, section: &str, index: usize) -> Result<Document> {
        self.mutate(|doc| doc.remove_item(section, index))
    }

    pub fn add_section(&self, name: &str) -> Result<Document> {
        self.mutate(|doc| doc.add_section(name))
    }

    pub fn remove_section(&self, name: &str) -> Result<Document> {
        self.mutate(|doc| doc.remove_section(name))
    }

    fn mutate(&self, transform: impl FnOnce(&mut Document) -> Option<String>) -> Result<Document> {
        let _guard = self.op_lock.lock().expect("op lock poisoned");
        let _ = self.git.refresh();

        let mut doc = self.load()?;
        let message = transform(&mut doc);
        if message.is_some() {
            self.write(&doc)?;
        }
        let _ = self.git.publish(message.as_deref().unwrap_or(NOOP_MESSAGE));
        Ok(doc)
    }

    /// Parse the working-copy document. A missing file is an empty store.
    fn load(&self) -> Result<Document> {
        let path = self.git.document_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(Error::ReadDocument { path, source: err }),
        };
        Ok(markdown::parse(&text))
    }

    fn write(&self, doc: &Document) -> Result<()> {
        let path = self.git.document_path();
        atomic_write(&path, markdown::serialize(doc).as_bytes())
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let write_err = |source| Error::WriteDocument {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    fs::write(temp.path(), data).map_err(write_err)?;
    temp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}
