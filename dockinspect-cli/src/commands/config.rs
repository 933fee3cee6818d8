//! `dockinspect --show-config` handler

use std::path::Path;

use tracing::info;

use dockinspect_core::config::Config;

use crate::error::CliError;
use crate::output::{ConfigReport, OutputWriter};

/// Display the effective configuration with secrets masked.
pub fn execute(
    config: &Config,
    source: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(source = ?source, "showing effective configuration");
    let report = ConfigReport::new(
        source.map(|p| p.display().to_string()),
        config.masked_entries(),
    );
    writer.render(&report)
}
