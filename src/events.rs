//! Progress Events
//!
//! Hook invoked by commit and restore for every processed file and directory and
//! for every completed revision. The core only emits; rendering belongs to the caller.

use crate::types::RevisionNumber;
use std::path::Path;

/// One unit of progress reported by capture or restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotEvent<'a> {
    /// A file was read (commit) or written (restore). `changed` is false when the
    /// stored buffer is shared with the previous revision.
    File { path: &'a Path, changed: bool },
    /// A directory finished processing; emitted after its children.
    Directory { path: &'a Path },
    /// A revision was appended (commit) or fully written (restore).
    Revision {
        number: RevisionNumber,
        path: &'a Path,
    },
}

/// Receiver for [`SnapshotEvent`]s.
pub trait EventSink {
    fn emit(&mut self, event: SnapshotEvent<'_>);
}

/// Ignores every event.
impl EventSink for () {
    fn emit(&mut self, _event: SnapshotEvent<'_>) {}
}

impl<F> EventSink for F
where
    F: FnMut(SnapshotEvent<'_>),
{
    fn emit(&mut self, event: SnapshotEvent<'_>) {
        self(event)
    }
}

/// Forwards events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: SnapshotEvent<'_>) {
        match event {
            SnapshotEvent::File { path, changed } => {
                tracing::debug!(path = %path.display(), changed, "file processed")
            }
            SnapshotEvent::Directory { path } => {
                tracing::debug!(path = %path.display(), "directory processed")
            }
            SnapshotEvent::Revision { number, path } => {
                tracing::debug!(number, path = %path.display(), "revision processed")
            }
        }
    }
}

/// Renders events as the human-readable progress lines printed by the CLI.
#[derive(Debug, Default, Clone)]
pub struct ProgressLines {
    lines: Vec<String>,
}

impl ProgressLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl EventSink for ProgressLines {
    fn emit(&mut self, event: SnapshotEvent<'_>) {
        let line = match event {
            SnapshotEvent::File {
                path,
                changed: true,
            } => format!("Processing {} *", path.display()),
            SnapshotEvent::File { path, .. } | SnapshotEvent::Directory { path } => {
                format!("Processing {}", path.display())
            }
            SnapshotEvent::Revision { number, .. } => format!("Revision {} processed.", number),
        };
        self.lines.push(line);
    }
}
