//! Repositories
//!
//! A set of named branches with one designated default, persisted as a single
//! file. Also hosts the destructive checkout protocol built on top of
//! [`Branch::commit`] and [`Branch::update`].

use crate::branch::Branch;
use crate::error::RepoError;
use crate::events::EventSink;
use crate::store::persistence;
use crate::types::{RevisionIndex, RevisionNumber, DEFAULT_BRANCH, FORMAT_VERSION};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Repository {
    pub(crate) branches: BTreeMap<String, Branch>,
    pub(crate) default_branch: String,
    pub(crate) format_version: String,
}

impl Repository {
    /// Create a repository with one empty branch monitoring `path`.
    ///
    /// The branch is named `branch_name`, or [`DEFAULT_BRANCH`] when omitted.
    pub fn create(path: impl AsRef<Path>, branch_name: Option<&str>) -> Result<Self, RepoError> {
        let name = branch_name.unwrap_or(DEFAULT_BRANCH).to_string();
        let branch = Branch::new(name.clone(), path)?;
        let mut branches = BTreeMap::new();
        branches.insert(name.clone(), branch);
        Ok(Repository {
            branches,
            default_branch: name,
            format_version: FORMAT_VERSION.to_string(),
        })
    }

    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    pub fn branch_names(&self) -> impl Iterator<Item = &str> {
        self.branches.keys().map(String::as_str)
    }

    /// Look up a branch; `None` selects the default branch.
    pub fn branch(&self, name: Option<&str>) -> Result<&Branch, RepoError> {
        let name = name.unwrap_or(&self.default_branch);
        self.branches
            .get(name)
            .ok_or_else(|| RepoError::NoSuchBranch(name.to_string()))
    }

    pub fn branch_mut(&mut self, name: Option<&str>) -> Result<&mut Branch, RepoError> {
        let name = name.unwrap_or(&self.default_branch);
        self.branches
            .get_mut(name)
            .ok_or_else(|| RepoError::NoSuchBranch(name.to_string()))
    }

    /// Add a branch with its own, initially empty history.
    pub fn add_branch(&mut self, name: &str, path: impl AsRef<Path>) -> Result<(), RepoError> {
        if self.has_branch(name) {
            return Err(RepoError::BranchExists(name.to_string()));
        }
        let branch = Branch::new(name, path)?;
        info!(branch = name, path = %branch.path().display(), "branch added");
        self.branches.insert(name.to_string(), branch);
        Ok(())
    }

    /// Remove a branch. The default branch cannot be removed.
    pub fn remove_branch(&mut self, name: &str) -> Result<Branch, RepoError> {
        if !self.has_branch(name) {
            return Err(RepoError::NoSuchBranch(name.to_string()));
        }
        if name == self.default_branch {
            return Err(RepoError::DefaultBranchRemoval(name.to_string()));
        }
        let removed = self
            .branches
            .remove(name)
            .ok_or_else(|| RepoError::NoSuchBranch(name.to_string()))?;
        info!(branch = name, "branch removed");
        Ok(removed)
    }

    /// Rename a branch; the default follows the rename.
    pub fn rename_branch(&mut self, name: &str, new_name: &str) -> Result<(), RepoError> {
        if !self.has_branch(name) {
            return Err(RepoError::NoSuchBranch(name.to_string()));
        }
        if name == new_name {
            return Ok(());
        }
        if self.has_branch(new_name) {
            return Err(RepoError::BranchExists(new_name.to_string()));
        }
        let mut branch = self
            .branches
            .remove(name)
            .ok_or_else(|| RepoError::NoSuchBranch(name.to_string()))?;
        branch.rename(new_name);
        self.branches.insert(new_name.to_string(), branch);
        if self.default_branch == name {
            self.default_branch = new_name.to_string();
        }
        info!(from = name, to = new_name, "branch renamed");
        Ok(())
    }

    pub fn set_default_branch(&mut self, name: &str) -> Result<(), RepoError> {
        if !self.has_branch(name) {
            return Err(RepoError::NoSuchBranch(name.to_string()));
        }
        self.default_branch = name.to_string();
        Ok(())
    }

    /// Commit the given (or default) branch. Returns whether a revision was appended.
    pub fn commit(
        &mut self,
        branch: Option<&str>,
        description: Option<String>,
        sink: &mut dyn EventSink,
    ) -> Result<bool, RepoError> {
        self.branch_mut(branch)?.commit(description, sink)
    }

    /// Restore a revision of the given (or default) branch, additively.
    pub fn update(
        &self,
        branch: Option<&str>,
        index: RevisionIndex,
        sink: &mut dyn EventSink,
    ) -> Result<(), RepoError> {
        self.branch(branch)?.update(index, sink)
    }

    /// Replace the monitored directory with the revision at `index`.
    ///
    /// Takes a backup commit labelled `backup_description`, wipes the directory
    /// and restores the requested revision. If the wipe fails, the latest
    /// revision (the backup) is restored and the wipe error is returned. On
    /// success the backup is dropped from memory again. Returns the resolved
    /// revision number.
    pub fn checkout(
        &mut self,
        branch: Option<&str>,
        index: RevisionIndex,
        backup_description: &str,
        sink: &mut dyn EventSink,
    ) -> Result<RevisionNumber, RepoError> {
        self.checkout_with(branch, index, backup_description, sink, |path| {
            std::fs::remove_dir_all(path)
        })
    }

    pub(crate) fn checkout_with<W>(
        &mut self,
        branch: Option<&str>,
        index: RevisionIndex,
        backup_description: &str,
        sink: &mut dyn EventSink,
        wipe: W,
    ) -> Result<RevisionNumber, RepoError>
    where
        W: FnOnce(&Path) -> std::io::Result<()>,
    {
        let branch = self.branch_mut(branch)?;
        let position = branch
            .resolve_index(index)
            .ok_or(RepoError::NoSuchRevision(index))?;

        if branch.path().is_dir() {
            let has_backup = branch.commit(Some(backup_description.to_string()), &mut ())?;
            if let Err(source) = wipe(branch.path()) {
                warn!(
                    branch = %branch.name(),
                    error = %source,
                    "failed to clear monitored directory, restoring latest revision"
                );
                branch.update(-1, &mut ())?;
                return Err(RepoError::io(branch.path(), source));
            }
            if has_backup {
                branch.discard_latest();
            }
        }

        branch.update(position as RevisionIndex, sink)?;
        info!(branch = %branch.name(), number = position, "checkout complete");
        Ok(position as RevisionNumber)
    }

    /// Persist the whole repository to `destination` atomically.
    pub fn save(&self, destination: impl AsRef<Path>) -> Result<(), RepoError> {
        persistence::save(self, destination.as_ref())
    }

    /// Load a repository, rejecting foreign content and other format versions.
    pub fn load(destination: impl AsRef<Path>) -> Result<Self, RepoError> {
        persistence::load(destination.as_ref())
    }
}
