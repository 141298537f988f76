//! Workspace config file source: <workspace>/vercont.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

/// Name of the optional per-workspace config file.
pub const WORKSPACE_CONFIG_FILE: &str = "vercont.toml";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = workspace_root.join(WORKSPACE_CONFIG_FILE);
    Ok(builder.add_source(File::from(path).required(false)))
}
