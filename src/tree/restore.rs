//! Writing snapshot nodes back onto the filesystem
//!
//! Restore is additive: entries present on disk but absent from the snapshot
//! are left untouched.

use crate::error::RepoError;
use crate::events::{EventSink, SnapshotEvent};
use crate::tree::node::{DirectoryNode, FileNode, Node};
use std::fs;
use std::path::Path;
use tracing::debug;

impl Node {
    /// Restore this node as `dest/<name>`.
    pub fn restore_to_disk(&self, dest: &Path, sink: &mut dyn EventSink) -> Result<(), RepoError> {
        match self {
            Node::File(file) => file.restore_to_disk(dest, sink),
            Node::Directory(dir) => dir.restore_to_disk(dest, sink),
        }
    }
}

impl FileNode {
    /// Write the decompressed content to `dest/<name>`, creating or truncating it.
    pub fn restore_to_disk(&self, dest: &Path, sink: &mut dyn EventSink) -> Result<(), RepoError> {
        let path = dest.join(&self.name);
        let content = self.content().map_err(|e| RepoError::io(&path, e))?;
        fs::write(&path, content).map_err(|e| RepoError::io(&path, e))?;
        sink.emit(SnapshotEvent::File {
            path: &path,
            changed: self.is_changed(),
        });
        Ok(())
    }
}

impl DirectoryNode {
    /// Ensure `dest/<name>` is a directory, then restore every child into it.
    pub fn restore_to_disk(&self, dest: &Path, sink: &mut dyn EventSink) -> Result<(), RepoError> {
        let path = dest.join(&self.name);
        if !path.is_dir() {
            debug!(path = %path.display(), "creating directory");
            fs::create_dir(&path).map_err(|e| RepoError::io(&path, e))?;
        }
        for child in self.children.values() {
            child.restore_to_disk(&path, sink)?;
        }
        sink.emit(SnapshotEvent::Directory { path: &path });
        Ok(())
    }
}
