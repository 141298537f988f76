//! Vercont: Local Snapshot Versioning
//!
//! Records successive snapshots of a directory tree as numbered revisions on
//! named branches and restores any of them on demand. Unchanged file contents
//! are shared between consecutive revisions, and a whole repository persists
//! as one versioned file.

pub mod branch;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod repository;
pub mod revision;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod views;

pub use branch::Branch;
pub use error::{ApiError, RepoError};
pub use events::{EventSink, ProgressLines, SnapshotEvent, TracingSink};
pub use repository::Repository;
pub use revision::Revision;
pub use tree::{DirectoryNode, FileNode, Node};
pub use types::{RevisionIndex, RevisionNumber};
