//! Snapshot node types: files, directories, and traversal

use crate::tree::blob::Blob;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Weak};

/// File node representation
///
/// A file node always owns (or shares) a stored blob, so a "never stored" file
/// cannot reach a persisted revision.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub(crate) name: String,
    pub(crate) data: Arc<Blob>,
    pub(crate) mtime: Option<DateTime<Utc>>,
    /// Stored buffer of the same-path file in the previous revision
    pub(crate) predecessor: Option<Weak<Blob>>,
}

impl FileNode {
    pub fn new(name: impl Into<String>, data: Arc<Blob>, mtime: Option<DateTime<Utc>>) -> Self {
        FileNode {
            name: name.into(),
            data,
            mtime,
            predecessor: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Arc<Blob> {
        &self.data
    }

    /// Decompressed file content.
    pub fn content(&self) -> std::io::Result<Vec<u8>> {
        self.data.decompress()
    }

    pub fn mtime(&self) -> Option<DateTime<Utc>> {
        self.mtime
    }

    pub fn stored_size(&self) -> u64 {
        self.data.stored_len() as u64
    }

    /// Whether this file introduced its own buffer rather than sharing the predecessor's.
    pub fn is_changed(&self) -> bool {
        match self.predecessor.as_ref().and_then(Weak::upgrade) {
            Some(previous) => !Arc::ptr_eq(&previous, &self.data),
            None => true,
        }
    }

    pub(crate) fn link_predecessor(&mut self, previous: &FileNode) {
        self.predecessor = Some(Arc::downgrade(&previous.data));
    }
}

impl PartialEq for FileNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && (Arc::ptr_eq(&self.data, &other.data) || self.data.same_content(&other.data))
    }
}

/// Directory node representation
#[derive(Debug, Clone, Default)]
pub struct DirectoryNode {
    pub(crate) name: String,
    /// Children keyed by name, ordered for deterministic restore and listing
    pub(crate) children: BTreeMap<String, Node>,
}

impl DirectoryNode {
    pub fn new(name: impl Into<String>) -> Self {
        DirectoryNode {
            name: name.into(),
            children: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.values()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Insert a child, replacing any existing child of the same name.
    pub fn insert(&mut self, node: Node) -> Option<Node> {
        self.children.insert(node.name().to_string(), node)
    }

    /// Look up a descendant by a `/`-separated path relative to this directory.
    pub fn find(&self, relative: &str) -> Option<&Node> {
        let mut parts = relative.split('/').filter(|p| !p.is_empty());
        let first = parts.next()?;
        let mut current = self.children.get(first)?;
        for part in parts {
            current = current.as_directory()?.children.get(part)?;
        }
        Some(current)
    }

    /// Sum of stored (compressed) buffer sizes over the subtree.
    pub fn stored_size(&self) -> u64 {
        self.children.values().map(Node::stored_size).sum()
    }

    /// Pre-order traversal: this directory, then each child in name order.
    ///
    /// The visitor receives every node with its path, starting from this
    /// directory's own name.
    pub fn visit<F>(&self, visitor: &mut F)
    where
        F: FnMut(&Path, NodeRef<'_>),
    {
        self.visit_at(Path::new(&self.name), visitor);
    }

    fn visit_at<F>(&self, path: &Path, visitor: &mut F)
    where
        F: FnMut(&Path, NodeRef<'_>),
    {
        visitor(path, NodeRef::Directory(self));
        for child in self.children.values() {
            let child_path = path.join(child.name());
            match child {
                Node::File(file) => visitor(&child_path, NodeRef::File(file)),
                Node::Directory(dir) => dir.visit_at(&child_path, visitor),
            }
        }
    }

    /// Point every file in this tree at its same-path counterpart in `previous`.
    pub(crate) fn link_predecessors(&mut self, previous: &DirectoryNode) {
        for (name, child) in self.children.iter_mut() {
            match (child, previous.children.get(name)) {
                (Node::File(file), Some(Node::File(prev))) => file.link_predecessor(prev),
                (Node::Directory(dir), Some(Node::Directory(prev))) => {
                    dir.link_predecessors(prev)
                }
                _ => {}
            }
        }
    }

    /// Whether the child-name sets of two directories differ.
    pub(crate) fn names_differ(&self, other: &DirectoryNode) -> bool {
        self.children.len() != other.children.len()
            || self.children.keys().any(|k| !other.children.contains_key(k))
    }
}

impl PartialEq for DirectoryNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.children.len() == other.children.len()
            && self.children.iter().all(|(name, child)| {
                other
                    .children
                    .get(name)
                    .map_or(false, |theirs| child == theirs)
            })
    }
}

/// Snapshot node type
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    File(FileNode),
    Directory(DirectoryNode),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::File(file) => &file.name,
            Node::Directory(dir) => &dir.name,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    pub fn stored_size(&self) -> u64 {
        match self {
            Node::File(file) => file.stored_size(),
            Node::Directory(dir) => dir.stored_size(),
        }
    }

    /// Pre-order traversal rooted at this node.
    pub fn visit<F>(&self, visitor: &mut F)
    where
        F: FnMut(&Path, NodeRef<'_>),
    {
        match self {
            Node::File(file) => visitor(Path::new(&file.name), NodeRef::File(file)),
            Node::Directory(dir) => dir.visit(visitor),
        }
    }
}

/// Borrowed view of a node handed to visitors.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    File(&'a FileNode),
    Directory(&'a DirectoryNode),
}

/// Root directory name for a monitored path: its last component.
pub fn root_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
