//! Branches
//!
//! A named, append-only sequence of revisions bound to one monitored directory.

use crate::error::RepoError;
use crate::events::{EventSink, SnapshotEvent};
use crate::revision::Revision;
use crate::tree::root_name;
use crate::types::{RevisionIndex, RevisionNumber};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Branch {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) revisions: Vec<Revision>,
}

impl Branch {
    /// Create an empty branch monitoring `path`, which must be a directory.
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = normalize_path(path.as_ref());
        check_directory(&path)?;
        Ok(Branch {
            name: name.into(),
            path,
            revisions: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    pub fn latest(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    /// Capture the monitored directory and append a revision if anything changed.
    ///
    /// Returns `false`, leaving history untouched, when the snapshot equals the
    /// latest revision.
    pub fn commit(
        &mut self,
        description: Option<String>,
        sink: &mut dyn EventSink,
    ) -> Result<bool, RepoError> {
        check_directory(&self.path)?;
        let candidate = Revision::commit(&self.path, self.latest(), description, sink)?;
        let Some(mut revision) = candidate else {
            info!(branch = %self.name, "nothing changed, commit skipped");
            return Ok(false);
        };

        revision.number = self.revisions.len() as RevisionNumber;
        info!(
            branch = %self.name,
            number = revision.number,
            stored_bytes = revision.stored_size(),
            "revision committed"
        );
        sink.emit(SnapshotEvent::Revision {
            number: revision.number,
            path: &self.path,
        });
        self.revisions.push(revision);
        Ok(true)
    }

    /// Restore the revision at `index` onto the monitored path.
    pub fn update(&self, index: RevisionIndex, sink: &mut dyn EventSink) -> Result<(), RepoError> {
        let revision = self
            .revision(index)
            .ok_or(RepoError::NoSuchRevision(index))?;
        revision.restore(&self.path, sink)?;
        sink.emit(SnapshotEvent::Revision {
            number: revision.number,
            path: &self.path,
        });
        Ok(())
    }

    /// Rebind the branch to `path`.
    ///
    /// The root node of every existing revision is renamed to the new last path
    /// component; snapshot content is not touched.
    pub fn set_path(&mut self, path: impl AsRef<Path>) {
        self.path = normalize_path(path.as_ref());
        let root = root_name(&self.path);
        for revision in &mut self.revisions {
            revision.root.name = root.clone();
        }
    }

    /// Bounds check with negative wraparound: valid range is `[-len, len - 1]`.
    pub fn has_revision(&self, index: RevisionIndex) -> bool {
        self.resolve_index(index).is_some()
    }

    /// Translate a possibly-negative index into a position in the history.
    pub fn resolve_index(&self, index: RevisionIndex) -> Option<usize> {
        let len = self.revisions.len() as i64;
        let resolved = if index < 0 { len + index } else { index };
        (0..len).contains(&resolved).then_some(resolved as usize)
    }

    pub fn revision(&self, index: RevisionIndex) -> Option<&Revision> {
        self.resolve_index(index).map(|i| &self.revisions[i])
    }

    pub fn revision_mut(&mut self, index: RevisionIndex) -> Option<&mut Revision> {
        self.resolve_index(index).map(move |i| &mut self.revisions[i])
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Drop the latest revision from memory.
    pub(crate) fn discard_latest(&mut self) -> Option<Revision> {
        self.revisions.pop()
    }
}

fn check_directory(path: &Path) -> Result<(), RepoError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(RepoError::NotADirectory(path.to_path_buf()))
    }
}

/// Absolute form of `path` without trailing separators.
///
/// Existing paths are canonicalized; others are made absolute against the
/// current directory.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return canonical;
    }
    let trimmed: PathBuf = path.components().collect();
    if trimmed.is_absolute() {
        trimmed
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&trimmed))
            .unwrap_or(trimmed)
    }
}
