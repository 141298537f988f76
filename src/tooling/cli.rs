//! CLI Tooling
//!
//! Command-line interface over the repository API. Every command loads the
//! repository file, applies one operation and saves when history or metadata
//! changed. The selected repository and branch travel in an explicit
//! [`Session`] value.

use crate::config::{ConfigLoader, VercontConfig};
use crate::error::{ApiError, RepoError};
use crate::events::{EventSink, ProgressLines, TracingSink};
use crate::logging::LoggingConfig;
use crate::repository::Repository;
use crate::store::persistence::repository_file_name;
use crate::tooling::format::{format_branch_listing_text, format_revision_detail_text};
use crate::types::{RevisionIndex, REPOSITORY_EXTENSION};
use crate::views::{BranchListing, RevisionDetail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Vercont CLI - Local snapshot versioning of directories
#[derive(Parser, Debug)]
#[command(name = "vercont")]
#[command(about = "Snapshot versioning of local directories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository name (defaults to the single .vcr file in the workspace)
    #[arg(short = 'r', long = "repo", global = true)]
    pub repo: Option<String>,

    /// Branch name (defaults to the repository's default branch)
    #[arg(short = 'b', long = "branch", global = true)]
    pub branch: Option<String>,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print every processed file and directory
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn session(&self) -> Session {
        Session {
            repository: self.repo.clone(),
            branch: self.branch.clone(),
        }
    }

    /// Fold the `--log-*` flags over the configured logging section.
    pub fn logging_config(&self, configured: &LoggingConfig) -> LoggingConfig {
        let mut logging = configured.clone();
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
        logging
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Commit the monitored directory of the branch
    #[command(visible_alias = "c")]
    Commit {
        /// Revision description
        description: Option<String>,
    },
    /// Replace the monitored directory with a revision (negative counts from the end)
    #[command(visible_alias = "u")]
    Update {
        #[arg(allow_negative_numbers = true)]
        revision: RevisionIndex,
    },
    /// Show the branch history, or the files of one revision
    #[command(visible_alias = "l")]
    List {
        #[arg(allow_negative_numbers = true)]
        revision: Option<RevisionIndex>,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Create a repository, or a new branch in an existing one
    New {
        /// Monitored directory (defaults to the default branch's path for new branches)
        path: Option<PathBuf>,
    },
    /// Delete a branch
    Del { name: String },
    /// Rename the selected branch
    Ren { new_name: String },
    /// Change the monitored directory of the selected branch
    Path { path: PathBuf },
    /// Set the description of a revision
    Desc {
        #[arg(allow_negative_numbers = true)]
        revision: RevisionIndex,
        description: String,
    },
    /// Set the default branch
    Def { name: String },
}

/// Repository and branch selected for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub repository: Option<String>,
    pub branch: Option<String>,
}

/// CLI context for managing workspace state
pub struct CliContext {
    workspace_root: PathBuf,
    config: VercontConfig,
    session: Session,
    verbose: bool,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(cfg_path) = &config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: VercontConfig) -> Self {
        Self {
            workspace_root,
            config,
            session: Session::default(),
            verbose: false,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &VercontConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        debug!(?command, session = ?self.session, "executing command");
        match command {
            Commands::Commit { description } => self.handle_commit(description.as_deref()),
            Commands::Update { revision } => self.handle_update(*revision),
            Commands::List { revision, format } => self.handle_list(*revision, format),
            Commands::New { path } => self.handle_new(path.as_deref()),
            Commands::Del { name } => self.handle_del(name),
            Commands::Ren { new_name } => self.handle_ren(new_name),
            Commands::Path { path } => self.handle_path(path),
            Commands::Desc {
                revision,
                description,
            } => self.handle_desc(*revision, description),
            Commands::Def { name } => self.handle_def(name),
        }
    }

    fn handle_commit(&self, description: Option<&str>) -> Result<String, ApiError> {
        let (name, file, mut repo) = self.open_repository()?;
        let branch = self.selected_branch();
        let (committed, progress) =
            self.with_sink(|sink| Ok(repo.commit(branch, description.map(str::to_string), sink)?))?;
        if !committed {
            return Ok(report(progress, "Nothing changed. Commit aborted.".to_string()));
        }
        repo.save(&file)?;
        let message = format!(
            "Revision committed to the branch \"{}\" of repository \"{}\".",
            repo.branch(branch)?.name(),
            name
        );
        Ok(report(progress, message))
    }

    fn handle_update(&self, revision: RevisionIndex) -> Result<String, ApiError> {
        let (_, _, mut repo) = self.open_repository()?;
        let branch = self.selected_branch();
        let backup = self.config.repository.backup_description.as_str();
        let (number, progress) =
            self.with_sink(|sink| Ok(repo.checkout(branch, revision, backup, sink)?))?;
        let message = format!(
            "Data updated to revision {} of branch \"{}\".",
            number,
            repo.branch(branch)?.name()
        );
        Ok(report(progress, message))
    }

    fn handle_list(
        &self,
        revision: Option<RevisionIndex>,
        format: &str,
    ) -> Result<String, ApiError> {
        let (name, _, repo) = self.open_repository()?;
        let branch = repo.branch(self.selected_branch())?;
        match revision {
            None => {
                let listing = BranchListing::build(&name, &repo, branch);
                render(&listing, format, format_branch_listing_text)
            }
            Some(index) => {
                let revision = branch
                    .revision(index)
                    .ok_or(RepoError::NoSuchRevision(index))?;
                let detail = RevisionDetail::build(&name, branch, revision);
                render(&detail, format, format_revision_detail_text)
            }
        }
    }

    fn handle_new(&self, path: Option<&Path>) -> Result<String, ApiError> {
        let name = self.repository_name()?.ok_or_else(|| {
            ApiError::usage("Provide the name of the new repository with --repo")
        })?;
        let file = self.workspace_root.join(&name);
        let path = path.map(|p| self.resolve_path(p));

        if file.exists() {
            let mut repo = Repository::load(&file)?;
            let branch = self.selected_branch().ok_or_else(|| {
                ApiError::usage("Provide the name of the new branch with --branch")
            })?;
            let path = match path {
                Some(path) => path,
                None => repo.branch(None)?.path().to_path_buf(),
            };
            repo.add_branch(branch, &path)?;
            let (_, progress) = self.with_sink(|sink| Ok(repo.commit(Some(branch), None, sink)?))?;
            repo.save(&file)?;
            info!(repository = %name, branch, "branch created");
            let message = format!(
                "Branch \"{}\" has been created and saved.\nMonitoring \"{}\".",
                branch,
                repo.branch(Some(branch))?.path().display()
            );
            return Ok(report(progress, message));
        }

        let path = path.ok_or_else(|| {
            ApiError::usage("Provide the directory monitored by the default branch")
        })?;
        let branch = self
            .selected_branch()
            .unwrap_or(self.config.repository.default_branch.as_str());
        let mut repo = Repository::create(&path, Some(branch))?;
        let (_, progress) = self.with_sink(|sink| Ok(repo.commit(None, None, sink)?))?;
        repo.save(&file)?;
        info!(repository = %name, branch, "repository created");
        let message = format!(
            "Repository \"{}\" has been created and saved.\nBranch \"{}\" monitors \"{}\".",
            name,
            branch,
            repo.branch(None)?.path().display()
        );
        Ok(report(progress, message))
    }

    fn handle_del(&self, branch: &str) -> Result<String, ApiError> {
        let (_, file, mut repo) = self.open_repository()?;
        repo.remove_branch(branch)?;
        repo.save(&file)?;
        Ok(format!("Branch \"{}\" deleted.", branch))
    }

    fn handle_ren(&self, new_name: &str) -> Result<String, ApiError> {
        let (_, file, mut repo) = self.open_repository()?;
        let old_name = repo.branch(self.selected_branch())?.name().to_string();
        repo.rename_branch(&old_name, new_name)?;
        repo.save(&file)?;
        Ok(format!("Branch \"{}\" renamed to \"{}\".", old_name, new_name))
    }

    fn handle_path(&self, path: &Path) -> Result<String, ApiError> {
        let (_, file, mut repo) = self.open_repository()?;
        let branch = repo.branch_mut(self.selected_branch())?;
        branch.set_path(self.resolve_path(path));
        let message = format!(
            "Path of branch \"{}\" set to \"{}\".",
            branch.name(),
            branch.path().display()
        );
        repo.save(&file)?;
        Ok(message)
    }

    fn handle_desc(&self, revision: RevisionIndex, description: &str) -> Result<String, ApiError> {
        let (_, file, mut repo) = self.open_repository()?;
        let branch = repo.branch_mut(self.selected_branch())?;
        let branch_name = branch.name().to_string();
        let target = branch
            .revision_mut(revision)
            .ok_or(RepoError::NoSuchRevision(revision))?;
        target.set_description(Some(description.to_string()));
        let number = target.number();
        repo.save(&file)?;
        Ok(format!(
            "Description of revision {} of branch \"{}\" set to:\n{}",
            number, branch_name, description
        ))
    }

    fn handle_def(&self, branch: &str) -> Result<String, ApiError> {
        let (_, file, mut repo) = self.open_repository()?;
        repo.set_default_branch(branch)?;
        repo.save(&file)?;
        Ok(format!("Default branch set to \"{}\".", branch))
    }

    fn selected_branch(&self) -> Option<&str> {
        self.session.branch.as_deref()
    }

    /// Explicit `--repo` name, otherwise the workspace's only repository file.
    fn repository_name(&self) -> Result<Option<String>, ApiError> {
        match &self.session.repository {
            Some(name) => Ok(Some(repository_file_name(name))),
            None => discover_repository(&self.workspace_root),
        }
    }

    fn open_repository(&self) -> Result<(String, PathBuf, Repository), ApiError> {
        let name = self.repository_name()?.ok_or_else(|| {
            ApiError::usage(
                "No repository found in the workspace; pass --repo NAME or create one with `vercont new PATH`",
            )
        })?;
        let file = self.workspace_root.join(&name);
        if !file.is_file() {
            return Err(ApiError::usage(format!(
                "Repository \"{}\" does not exist",
                name
            )));
        }
        let repo = Repository::load(&file)?;
        Ok((name, file, repo))
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    /// Run `operation` with the progress sink matching the verbosity, returning
    /// the rendered progress lines alongside its result.
    fn with_sink<T>(
        &self,
        operation: impl FnOnce(&mut dyn EventSink) -> Result<T, ApiError>,
    ) -> Result<(T, Vec<String>), ApiError> {
        if self.verbose {
            let mut lines = ProgressLines::new();
            let value = operation(&mut lines)?;
            Ok((value, lines.into_lines()))
        } else {
            let value = operation(&mut TracingSink)?;
            Ok((value, Vec::new()))
        }
    }
}

/// Find the single repository file in `dir`.
///
/// Returns `None` when there is none and a usage error when there are several.
pub fn discover_repository(dir: &Path) -> Result<Option<String>, ApiError> {
    let entries = std::fs::read_dir(dir).map_err(|e| RepoError::io(dir, e))?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RepoError::io(dir, e))?;
        let path = entry.path();
        let is_repository = path.is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some(REPOSITORY_EXTENSION);
        if !is_repository {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            found.push(name.to_string());
        }
    }
    found.sort();
    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        _ => Err(ApiError::usage(format!(
            "Several repositories found ({}); pass --repo NAME",
            found.join(", ")
        ))),
    }
}

fn render<T: Serialize>(
    value: &T,
    format: &str,
    text: fn(&T) -> String,
) -> Result<String, ApiError> {
    if format == "json" {
        return Ok(serde_json::to_string_pretty(value)?);
    }
    Ok(text(value))
}

fn report(progress: Vec<String>, message: String) -> String {
    if progress.is_empty() {
        message
    } else {
        format!("{}\n{}", progress.join("\n"), message)
    }
}
