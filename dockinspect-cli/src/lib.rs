//! dockinspect CLI library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `dockinspect` is used as a binary (main.rs).

pub mod cli;
pub mod commands;
pub mod error;
pub mod hub;
pub mod logging;
pub mod output;
pub mod sink;
pub mod usage;

use std::sync::Arc;

use tracing::debug;

use dockinspect_core::config::Config;
use dockinspect_inspector::BollardDockerClient;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Dispatch one CLI invocation.
///
/// `--help-properties` needs neither configuration nor an engine and is
/// handled first. Logging is initialized once the configuration (and with it
/// `logging.level`) is known.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    if cli.help_properties {
        let stdout = std::io::stdout();
        return commands::properties::execute(&mut stdout.lock());
    }

    let properties = cli::parse_properties(&cli.properties)?;
    let config_path = cli.config_path();
    let config = Config::load(config_path.as_deref(), &properties).await?;

    logging::init_tracing(&config.logging_level, cli.log_format)
        .map_err(|e| CliError::Command(e.to_string()))?;
    debug!(config = ?config_path, properties = properties.len(), "configuration loaded");

    let writer = OutputWriter::new(cli.output);

    if cli.show_config {
        return commands::config::execute(&config, config_path.as_deref(), &writer);
    }

    let docker = Arc::new(BollardDockerClient::connect_local()?);

    if cli.engine_version {
        return commands::engine::execute(docker.as_ref(), &writer).await;
    }

    commands::inspect::execute(docker, Arc::new(config), &writer).await
}
