//! Tooling Layer
//!
//! Command-line surface and text rendering over the repository API.

pub mod cli;
pub mod format;

pub use cli::{discover_repository, Cli, CliContext, Commands, Session};
