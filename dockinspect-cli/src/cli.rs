//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O, apart from
//! [`parse_properties`] which turns the trailing `--key=value` arguments into
//! configuration overrides.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::CliError;

/// Default configuration file, used when present and `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "dockinspect.toml";

/// dockinspect -- inspect a container image and produce its bill of materials.
///
/// Configuration properties are passed last, as `--<key>=<value>`
/// (see `--help-properties`).
#[derive(Parser, Debug)]
#[command(name = "dockinspect", version, about, long_about = None)]
pub struct Cli {
    /// Path to a dockinspect.toml configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Output format for reports printed to stdout.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,

    /// Print the available configuration properties and exit.
    #[arg(long)]
    pub help_properties: bool,

    /// Print the effective configuration (secrets masked) and exit.
    #[arg(long)]
    pub show_config: bool,

    /// Print the container engine version and exit.
    #[arg(long)]
    pub engine_version: bool,

    /// Configuration properties as `--<key>=<value>`.
    #[arg(
        value_name = "PROPERTY",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub properties: Vec<String>,
}

/// Supported log formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    Pretty,
    /// Machine-parseable JSON lines.
    Json,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl Cli {
    /// The configuration file to load, if any.
    ///
    /// An explicit `--config` is always returned (a missing file is then an
    /// error); otherwise the default file is used only when it exists.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        }
    }
}

/// Parses `--key=value` arguments into `(key, value)` pairs.
///
/// A bare `--key` is shorthand for `--key=true`.
pub fn parse_properties(args: &[String]) -> Result<Vec<(String, String)>, CliError> {
    args.iter()
        .map(|arg| {
            let body = arg.strip_prefix("--").ok_or_else(|| {
                CliError::Command(format!(
                    "unexpected argument '{arg}', properties must look like --key=value"
                ))
            })?;
            let (key, value) = body.split_once('=').unwrap_or((body, "true"));
            if key.is_empty() {
                return Err(CliError::Command(format!("property '{arg}' has no key")));
            }
            Ok((key.to_owned(), value.to_owned()))
        })
        .collect()
}
