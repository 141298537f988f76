//! Revisions
//!
//! One committed snapshot of a branch's monitored directory: a root directory
//! node plus sequence number, timestamp and description.

use crate::error::RepoError;
use crate::events::EventSink;
use crate::tree::{capture_directory, root_name, DirectoryNode, NodeRef};
use crate::types::RevisionNumber;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, info};

/// A committed snapshot
#[derive(Debug, Clone)]
pub struct Revision {
    pub(crate) number: RevisionNumber,
    pub(crate) description: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) root: DirectoryNode,
    /// Number of the prior revision in the same branch
    pub(crate) previous: Option<RevisionNumber>,
}

impl Revision {
    /// Capture `from_path` against `previous` and build a candidate revision.
    ///
    /// The whole tree is captured before comparing, so drift anywhere is detected.
    /// Returns `None` when the captured root is deep-equal to the previous root.
    pub fn commit(
        from_path: &Path,
        previous: Option<&Revision>,
        description: Option<String>,
        sink: &mut dyn EventSink,
    ) -> Result<Option<Revision>, RepoError> {
        let (root, changed) = capture_directory(
            from_path,
            root_name(from_path),
            previous.map(|p| &p.root),
            sink,
        )?;

        if let Some(previous) = previous {
            if root == previous.root {
                debug!(
                    path = %from_path.display(),
                    changed,
                    "snapshot identical to previous revision"
                );
                return Ok(None);
            }
        }

        Ok(Some(Revision {
            number: previous.map_or(0, |p| p.number + 1),
            description,
            created_at: Utc::now(),
            root,
            previous: previous.map(|p| p.number),
        }))
    }

    /// Restore this revision so that its root lands on `to_path`.
    ///
    /// The root is written under `to_path`'s parent using the root's own name.
    pub fn restore(&self, to_path: &Path, sink: &mut dyn EventSink) -> Result<(), RepoError> {
        let parent = to_path.parent().unwrap_or(to_path);
        info!(number = self.number, path = %to_path.display(), "restoring revision");
        self.root.restore_to_disk(parent, sink)
    }

    pub fn number(&self) -> RevisionNumber {
        self.number
    }

    pub fn previous(&self) -> Option<RevisionNumber> {
        self.previous
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn root(&self) -> &DirectoryNode {
        &self.root
    }

    pub fn stored_size(&self) -> u64 {
        self.root.stored_size()
    }

    /// Pre-order traversal of the revision tree.
    pub fn visit<F>(&self, visitor: &mut F)
    where
        F: FnMut(&Path, NodeRef<'_>),
    {
        self.root.visit(visitor);
    }
}
