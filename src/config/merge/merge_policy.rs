//! Built-in defaults every merge starts from.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the defaults of every setting that has one.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("repository.default_branch", crate::types::DEFAULT_BRANCH)?
        .set_default(
            "repository.backup_description",
            crate::types::BACKUP_DESCRIPTION,
        )?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
