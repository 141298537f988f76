//! Core types for the vercont snapshot versioning engine.

/// RevisionNumber: 0-based position of a revision within its branch
pub type RevisionNumber = u64;

/// RevisionIndex: caller-supplied revision address; negative values count from the end
pub type RevisionIndex = i64;

/// Format tag written into every repository and compared exactly on load
pub const FORMAT_VERSION: &str = "vercont-model/1";

/// File extension of persisted repositories
pub const REPOSITORY_EXTENSION: &str = "vcr";

/// Branch name used when a repository is created without one
pub const DEFAULT_BRANCH: &str = "trunk";

/// Description attached to the safety commit taken before a destructive checkout
pub const BACKUP_DESCRIPTION: &str = "BACKUP";
