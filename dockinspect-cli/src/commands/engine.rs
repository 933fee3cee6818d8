//! `dockinspect --engine-version` handler

use tracing::warn;

use dockinspect_inspector::{DockerClient, InspectorError};

use crate::error::CliError;
use crate::output::{EngineVersionReport, OutputWriter};

/// Version reported when the engine cannot be queried.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Print the container engine server version.
///
/// An unreachable engine is not an error here; the version is reported as
/// `Unknown`.
pub async fn execute<D: DockerClient>(docker: &D, writer: &OutputWriter) -> Result<(), CliError> {
    let report = version_report(docker.engine_version().await);
    writer.render(&report)
}

/// Builds the report from the engine query result.
pub fn version_report(version: Result<String, InspectorError>) -> EngineVersionReport {
    let engine_version = match version {
        Ok(v) if !v.trim().is_empty() => v,
        Ok(_) => UNKNOWN_VERSION.to_owned(),
        Err(e) => {
            warn!(error = %e, "could not query container engine version");
            UNKNOWN_VERSION.to_owned()
        }
    };
    EngineVersionReport { engine_version }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_engine_version() {
        let report = version_report(Ok("24.0.7".to_owned()));
        assert_eq!(report.engine_version, "24.0.7");
    }

    #[test]
    fn unreachable_engine_is_unknown() {
        let report = version_report(Err(InspectorError::EngineUnavailable(
            "connection refused".to_owned(),
        )));
        assert_eq!(report.engine_version, "Unknown");
    }

    #[test]
    fn blank_version_is_unknown() {
        assert_eq!(version_report(Ok(String::new())).engine_version, "Unknown");
    }
}
