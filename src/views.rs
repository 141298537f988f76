//! Listing Views
//!
//! Serializable summaries of branches and revisions built from the core model
//! for the `list` command. Text rendering lives in `tooling::format`.

use crate::branch::Branch;
use crate::repository::Repository;
use crate::revision::Revision;
use crate::tree::NodeRef;
use crate::types::RevisionNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the revision table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionSummary {
    pub number: RevisionNumber,
    pub created_at: DateTime<Utc>,
    pub stored_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RevisionSummary {
    pub fn from_revision(revision: &Revision) -> Self {
        Self {
            number: revision.number(),
            created_at: revision.created_at(),
            stored_size: revision.stored_size(),
            description: revision.description().map(str::to_string),
        }
    }
}

/// Overview of one branch and its history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchListing {
    pub repository: String,
    pub branch: String,
    pub default_branch: String,
    pub branches: Vec<String>,
    pub path: String,
    pub revisions: Vec<RevisionSummary>,
}

impl BranchListing {
    pub fn build(repository_name: &str, repository: &Repository, branch: &Branch) -> Self {
        Self {
            repository: repository_name.to_string(),
            branch: branch.name().to_string(),
            default_branch: repository.default_branch().to_string(),
            branches: repository.branch_names().map(str::to_string).collect(),
            path: branch.path().display().to_string(),
            revisions: branch
                .revisions()
                .iter()
                .map(RevisionSummary::from_revision)
                .collect(),
        }
    }
}

/// A file inside a revision, flagged when it introduced new content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub changed: bool,
}

/// Detail of one revision: its summary plus every file it contains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionDetail {
    pub repository: String,
    pub branch: String,
    pub revision: RevisionSummary,
    pub files: Vec<FileEntry>,
}

impl RevisionDetail {
    pub fn build(repository_name: &str, branch: &Branch, revision: &Revision) -> Self {
        let mut files = Vec::new();
        revision.visit(&mut |path, node| {
            if let NodeRef::File(file) = node {
                files.push(FileEntry {
                    path: path.display().to_string(),
                    changed: file.is_changed(),
                });
            }
        });
        Self {
            repository: repository_name.to_string(),
            branch: branch.name().to_string(),
            revision: RevisionSummary::from_revision(revision),
            files,
        }
    }
}
