//! CLI-specific error types and exit code mapping

use dockinspect_core::error::ConfigError;
use dockinspect_inspector::InspectorError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Wrapped domain error from the inspection orchestrator.
    #[error("{0}")]
    Inspector(#[from] InspectorError),

    /// A command-line usage or startup problem.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                         |
    /// |------|-------------------------------------------------|
    /// | 0    | Success                                         |
    /// | 1    | General / engine API / exec / missing output    |
    /// | 2    | Configuration error                             |
    /// | 3    | Container engine unavailable                    |
    /// | 4    | Remote inspection failed                        |
    /// | 5    | Hub upload failed                               |
    /// | 10   | IO error                                        |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Inspector(e) => match e {
                InspectorError::Configuration(_) => 2,
                InspectorError::EngineUnavailable(_) => 3,
                InspectorError::RemoteInspectionFailed { .. } => 4,
                InspectorError::Upload { .. } => 5,
                InspectorError::Io { .. } => 10,
                _ => 1,
            },
            Self::Io(_) => 10,
            Self::Command(_) | Self::JsonSerialize(_) => 1,
        }
    }
}
