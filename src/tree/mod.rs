//! Snapshot tree: file and directory nodes, capture from disk, restore to disk

pub mod blob;
pub mod capture;
pub mod node;
pub mod restore;

pub use blob::Blob;
pub use capture::{capture_directory, capture_from_disk};
pub use node::{root_name, DirectoryNode, FileNode, Node, NodeRef};
