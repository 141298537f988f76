//! Configuration
//!
//! Layered settings for the command layer and logging. Sources, lowest
//! precedence first: built-in defaults, the global file
//! (`$XDG_CONFIG_HOME/vercont/config.toml`), the workspace file
//! (`<workspace>/vercont.toml`), and `VERCONT__*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::logging::LoggingConfig;
use crate::types::{BACKUP_DESCRIPTION, DEFAULT_BRANCH};
use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VercontConfig {
    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Repository defaults used by the command layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Branch name for newly created repositories
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Description of the safety commit taken before `update`
    #[serde(default = "default_backup_description")]
    pub backup_description: String,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_backup_description() -> String {
    BACKUP_DESCRIPTION.to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            backup_description: default_backup_description(),
        }
    }
}
