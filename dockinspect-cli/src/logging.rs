//! Logging initialization for the dockinspect CLI.
//!
//! Configures `tracing-subscriber` from the `logging.level` option and the
//! `--log-format` flag. `RUST_LOG`, when set, takes precedence over the option.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::LogFormat;

/// Filter directive for a `logging.level` value (`INFO` → `info`).
pub fn filter_directive(level: &str) -> String {
    level.trim().to_ascii_lowercase()
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing output is expected.
/// Logs go to stderr so that reports on stdout stay machine-readable.
pub fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e)
                })?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
                })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_lowercased() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive(" Info "), "info");
    }

    #[test]
    fn directive_is_a_valid_filter() {
        for level in ["ERROR", "WARN", "INFO", "DEBUG", "TRACE"] {
            assert!(EnvFilter::try_new(filter_directive(level)).is_ok());
        }
    }
}
