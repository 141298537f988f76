//! Capturing live filesystem entries into snapshot nodes

use crate::error::RepoError;
use crate::events::{EventSink, SnapshotEvent};
use crate::tree::blob::Blob;
use crate::tree::node::{DirectoryNode, FileNode, Node};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Capture the entry at `live_path` against the same-path node of the previous revision.
///
/// Returns the new node and whether it differs from `predecessor`. Files whose
/// bytes match the predecessor share its stored buffer; a predecessor of the
/// other kind (file vs directory) is ignored.
pub fn capture_from_disk(
    live_path: &Path,
    predecessor: Option<&Node>,
    sink: &mut dyn EventSink,
) -> Result<(Node, bool), RepoError> {
    let metadata = fs::metadata(live_path).map_err(|e| RepoError::io(live_path, e))?;
    let name = entry_name(live_path)?;
    if metadata.is_dir() {
        let (dir, changed) = capture_directory(
            live_path,
            name,
            predecessor.and_then(Node::as_directory),
            sink,
        )?;
        Ok((Node::Directory(dir), changed))
    } else {
        let (file, changed) = capture_file(
            live_path,
            &metadata,
            name,
            predecessor.and_then(Node::as_file),
            sink,
        )?;
        Ok((Node::File(file), changed))
    }
}

/// Capture a directory tree rooted at `live_path` under the given node name.
pub fn capture_directory(
    live_path: &Path,
    name: String,
    predecessor: Option<&DirectoryNode>,
    sink: &mut dyn EventSink,
) -> Result<(DirectoryNode, bool), RepoError> {
    let entries = fs::read_dir(live_path).map_err(|e| RepoError::io(live_path, e))?;
    let mut dir = DirectoryNode::new(name);
    let mut changed = predecessor.is_none();

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RepoError::io(live_path, e))?;
        paths.push(entry.path());
    }
    paths.sort();

    for entry_path in paths {
        let child_name = entry_name(&entry_path)?;
        let previous_child = predecessor.and_then(|p| p.children.get(&child_name));
        let (child, child_changed) = capture_from_disk(&entry_path, previous_child, sink)?;
        changed |= child_changed;
        dir.children.insert(child_name, child);
    }

    if let Some(previous) = predecessor {
        changed |= dir.names_differ(previous);
    }

    sink.emit(SnapshotEvent::Directory { path: live_path });
    Ok((dir, changed))
}

fn capture_file(
    live_path: &Path,
    metadata: &fs::Metadata,
    name: String,
    predecessor: Option<&FileNode>,
    sink: &mut dyn EventSink,
) -> Result<(FileNode, bool), RepoError> {
    let modified = metadata.modified().map_err(|e| RepoError::io(live_path, e))?;
    let mtime = Some(DateTime::<Utc>::from(modified));
    let raw = fs::read(live_path).map_err(|e| RepoError::io(live_path, e))?;

    let reusable = match predecessor {
        Some(previous) => {
            let stored = previous
                .content()
                .map_err(|e| RepoError::io(live_path, e))?;
            (stored == raw).then(|| previous.data.clone())
        }
        None => None,
    };

    let (data, changed) = match reusable {
        Some(shared) => (shared, false),
        None => {
            let blob = Blob::compress(&raw).map_err(|e| RepoError::io(live_path, e))?;
            (Arc::new(blob), true)
        }
    };
    debug!(path = %live_path.display(), changed, "captured file");

    let mut file = FileNode::new(name, data, mtime);
    if let Some(previous) = predecessor {
        file.link_predecessor(previous);
    }
    sink.emit(SnapshotEvent::File {
        path: live_path,
        changed,
    });
    Ok((file, changed))
}

fn entry_name(path: &Path) -> Result<String, RepoError> {
    let name = path.file_name().ok_or_else(|| {
        RepoError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    name.to_str().map(str::to_string).ok_or_else(|| {
        RepoError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, "file name is not UTF-8"),
        )
    })
}
