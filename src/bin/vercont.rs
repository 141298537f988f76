//! Vercont CLI Binary
//!
//! Command-line interface for the vercont snapshot versioning engine.

use anyhow::Context;
use clap::Parser;
use std::process;
use vercont::error::ApiError;
use vercont::logging::init_logging;
use vercont::tooling::cli::{Cli, CliContext};

fn main() {
    let cli = Cli::parse();

    let context = match start(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error initializing workspace: {:#}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            let code = match e {
                ApiError::Usage(_) => 2,
                _ => 1,
            };
            process::exit(code);
        }
    }
}

/// Load configuration, install logging and build the command context.
fn start(cli: &Cli) -> anyhow::Result<CliContext> {
    let context = CliContext::new(cli.workspace.clone(), cli.config.clone())
        .with_context(|| format!("loading configuration for {}", cli.workspace.display()))?;
    let logging = cli.logging_config(&context.config().logging);
    init_logging(Some(&logging)).context("installing logger")?;
    Ok(context.with_session(cli.session()).with_verbose(cli.verbose))
}
