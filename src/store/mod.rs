//! Repository Records
//!
//! Explicit, versioned on-disk representation of a repository. The in-memory
//! graph is flattened into records: every distinct stored buffer is written
//! once into a blob table and file records refer to it by index, so sharing
//! between revisions survives a save/load cycle.

pub mod persistence;

use crate::branch::Branch;
use crate::error::RepoError;
use crate::repository::Repository;
use crate::revision::Revision;
use crate::tree::{Blob, DirectoryNode, FileNode, Node};
use crate::types::RevisionNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Leading bytes of every repository file
pub const MAGIC: [u8; 8] = *b"VERCONT\0";

/// Deepest directory nesting accepted when decoding a revision tree
pub const MAX_TREE_DEPTH: usize = 512;

/// Header written before the repository record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHeader {
    pub magic: [u8; 8],
    pub format_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub default_branch: String,
    pub blobs: Vec<Vec<u8>>,
    pub branches: Vec<BranchRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRecord {
    pub name: String,
    pub path: PathBuf,
    pub revisions: Vec<RevisionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionRecord {
    pub number: RevisionNumber,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Flattened tree in pre-order; `nodes[0]` is the root directory.
    pub nodes: Vec<NodeRecord>,
}

/// One node of a flattened revision tree
///
/// Every node except the root names its parent by index, and a parent always
/// precedes its children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub parent: Option<u32>,
    pub node_type: NodeType,
}

/// Node type enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeType {
    File {
        blob: u32,
        mtime: Option<DateTime<Utc>>,
    },
    Directory,
}

/// Assigns one table slot per distinct `Arc<Blob>`.
#[derive(Default)]
struct BlobTable {
    slots: HashMap<usize, u32>,
    blobs: Vec<Vec<u8>>,
}

impl BlobTable {
    fn slot(&mut self, blob: &Arc<Blob>) -> u32 {
        let key = Arc::as_ptr(blob) as usize;
        if let Some(slot) = self.slots.get(&key) {
            return *slot;
        }
        let slot = self.blobs.len() as u32;
        self.blobs.push(blob.compressed().to_vec());
        self.slots.insert(key, slot);
        slot
    }
}

impl RepositoryRecord {
    pub fn from_repository(repository: &Repository) -> Self {
        let mut table = BlobTable::default();
        let branches = repository
            .branches
            .values()
            .map(|branch| BranchRecord {
                name: branch.name.clone(),
                path: branch.path.clone(),
                revisions: branch
                    .revisions
                    .iter()
                    .map(|revision| RevisionRecord {
                        number: revision.number,
                        description: revision.description.clone(),
                        created_at: revision.created_at,
                        nodes: flatten_tree(&revision.root, &mut table),
                    })
                    .collect(),
            })
            .collect();
        RepositoryRecord {
            default_branch: repository.default_branch.clone(),
            blobs: table.blobs,
            branches,
        }
    }

    /// Rebuild the repository graph, validating every structural invariant.
    ///
    /// `location` is only used for error reporting.
    pub fn into_repository(
        self,
        format_version: String,
        location: &Path,
    ) -> Result<Repository, RepoError> {
        let blobs = self
            .blobs
            .into_iter()
            .enumerate()
            .map(|(slot, bytes)| {
                let blob = Blob::from_compressed(bytes);
                blob.verify().map_err(|e| {
                    RepoError::corrupt(location, format!("blob {} is not valid zlib: {}", slot, e))
                })?;
                Ok(Arc::new(blob))
            })
            .collect::<Result<Vec<_>, RepoError>>()?;

        let mut branches = BTreeMap::new();
        for record in self.branches {
            let mut revisions: Vec<Revision> = Vec::with_capacity(record.revisions.len());
            for (position, revision) in record.revisions.into_iter().enumerate() {
                if revision.number != position as RevisionNumber {
                    return Err(RepoError::corrupt(
                        location,
                        format!(
                            "branch {} has revision {} at position {}",
                            record.name, revision.number, position
                        ),
                    ));
                }
                let mut root = rebuild_tree(revision.nodes, &blobs, location)?;
                if let Some(previous) = revisions.last() {
                    root.link_predecessors(&previous.root);
                }
                revisions.push(Revision {
                    number: revision.number,
                    description: revision.description,
                    created_at: revision.created_at,
                    root,
                    previous: position.checked_sub(1).map(|p| p as RevisionNumber),
                });
            }
            let branch = Branch {
                name: record.name.clone(),
                path: record.path,
                revisions,
            };
            if branches.insert(record.name.clone(), branch).is_some() {
                return Err(RepoError::corrupt(
                    location,
                    format!("duplicate branch {}", record.name),
                ));
            }
        }

        if !branches.contains_key(&self.default_branch) {
            return Err(RepoError::corrupt(
                location,
                format!("default branch {} does not exist", self.default_branch),
            ));
        }

        Ok(Repository {
            branches,
            default_branch: self.default_branch,
            format_version,
        })
    }
}

fn flatten_tree(root: &DirectoryNode, table: &mut BlobTable) -> Vec<NodeRecord> {
    let mut nodes = vec![NodeRecord {
        name: root.name.clone(),
        parent: None,
        node_type: NodeType::Directory,
    }];
    flatten_children(root, 0, &mut nodes, table);
    nodes
}

fn flatten_children(
    dir: &DirectoryNode,
    parent: u32,
    nodes: &mut Vec<NodeRecord>,
    table: &mut BlobTable,
) {
    for child in dir.children.values() {
        let index = nodes.len() as u32;
        match child {
            Node::File(file) => nodes.push(NodeRecord {
                name: file.name.clone(),
                parent: Some(parent),
                node_type: NodeType::File {
                    blob: table.slot(&file.data),
                    mtime: file.mtime,
                },
            }),
            Node::Directory(sub) => {
                nodes.push(NodeRecord {
                    name: sub.name.clone(),
                    parent: Some(parent),
                    node_type: NodeType::Directory,
                });
                flatten_children(sub, index, nodes, table);
            }
        }
    }
}

/// Rebuild a directory tree from its flattened records.
///
/// Parent links, nesting depth and entry names are validated before any node
/// is built; children are attached in reverse order so every directory is
/// complete before it moves into its parent.
fn rebuild_tree(
    nodes: Vec<NodeRecord>,
    blobs: &[Arc<Blob>],
    location: &Path,
) -> Result<DirectoryNode, RepoError> {
    if nodes.is_empty() {
        return Err(RepoError::corrupt(location, "revision has no root directory"));
    }

    let mut depths: Vec<usize> = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            check_entry_name(&node.name, location)?;
        }
        let depth = match (index, node.parent) {
            (0, None) if matches!(node.node_type, NodeType::Directory) => 0,
            (0, _) => {
                return Err(RepoError::corrupt(location, "revision root is not a directory"));
            }
            (_, Some(parent))
                if (parent as usize) < index
                    && matches!(nodes[parent as usize].node_type, NodeType::Directory) =>
            {
                depths[parent as usize] + 1
            }
            _ => {
                return Err(RepoError::corrupt(
                    location,
                    format!("node {} ({}) has an invalid parent link", index, node.name),
                ));
            }
        };
        if depth > MAX_TREE_DEPTH {
            return Err(RepoError::corrupt(
                location,
                format!("tree nesting exceeds {} levels", MAX_TREE_DEPTH),
            ));
        }
        depths.push(depth);
    }

    let mut parents = Vec::with_capacity(nodes.len());
    let mut slots = Vec::with_capacity(nodes.len());
    for node in nodes {
        parents.push(node.parent.map(|p| p as usize));
        let built = match node.node_type {
            NodeType::File { blob, mtime } => {
                let data = blobs.get(blob as usize).cloned().ok_or_else(|| {
                    RepoError::corrupt(
                        location,
                        format!("file {} refers to missing blob {}", node.name, blob),
                    )
                })?;
                Node::File(FileNode::new(node.name, data, mtime))
            }
            NodeType::Directory => Node::Directory(DirectoryNode::new(node.name)),
        };
        slots.push(Some(built));
    }

    for index in (1..slots.len()).rev() {
        let (Some(node), Some(parent)) = (slots[index].take(), parents[index]) else {
            return Err(RepoError::corrupt(location, format!("node {} is detached", index)));
        };
        let Some(Node::Directory(dir)) = slots[parent].as_mut() else {
            return Err(RepoError::corrupt(
                location,
                format!("node {} has an invalid parent link", index),
            ));
        };
        if dir.insert(node).is_some() {
            return Err(RepoError::corrupt(
                location,
                format!("duplicate entry in directory {}", dir.name),
            ));
        }
    }

    match slots.first_mut().and_then(Option::take) {
        Some(Node::Directory(root)) => Ok(root),
        _ => Err(RepoError::corrupt(location, "revision root is not a directory")),
    }
}

/// Entry names must be single path components so restore stays inside its target.
fn check_entry_name(name: &str, location: &Path) -> Result<(), RepoError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.chars().any(std::path::is_separator);
    if valid {
        Ok(())
    } else {
        Err(RepoError::corrupt(location, format!("invalid entry name {:?}", name)))
    }
}
