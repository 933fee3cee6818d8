//! Default action: run one inspection

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use dockinspect_core::config::Config;
use dockinspect_inspector::{DockerClient, Orchestrator, RunReport, SCAN_CLI_OPTS_ENV};

use crate::error::CliError;
use crate::hub::HubUploader;
use crate::output::{OutputWriter, RunSummary};
use crate::sink::{ArtifactSink, SinkOutcome};

/// Run the inspection and print its summary.
///
/// # Errors
///
/// Returns `CliError::Inspector` for any failure during the run, including a
/// failed Hub upload.
pub async fn execute<D: DockerClient>(
    docker: Arc<D>,
    config: Arc<Config>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let scan_cli_opts = std::env::var(SCAN_CLI_OPTS_ENV).ok();
    let summary = run(docker, config, scan_cli_opts.as_deref()).await?;
    writer.render(&summary)
}

/// Run the inspection and collect its summary without printing.
pub async fn run<D: DockerClient>(
    docker: Arc<D>,
    config: Arc<Config>,
    scan_cli_opts: Option<&str>,
) -> Result<RunSummary, CliError> {
    let uploader = HubUploader::from_config(&config, scan_cli_opts)?;
    let sink = ArtifactSink::new(output_dir(&config), uploader);

    let report = Orchestrator::new(docker, config).run(&sink).await?;
    let outcome = sink.outcome().await;
    info!(
        run_id = %report.run_id,
        written = outcome.written.len(),
        uploaded = outcome.uploaded,
        "inspection finished"
    );

    Ok(summarize(&report, sink.output_dir(), &outcome))
}

/// `output.path`, if set.
pub fn output_dir(config: &Config) -> Option<PathBuf> {
    let path = config.output_path.trim();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

fn summarize(report: &RunReport, output_dir: Option<&Path>, outcome: &SinkOutcome) -> RunSummary {
    RunSummary {
        run_id: report.run_id.to_string(),
        strategy: report.strategy.to_string(),
        documents: report.result.source_filename_hints.clone(),
        output_path: output_dir.map(|p| p.display().to_string()),
        uploaded: outcome.uploaded,
        cleanup_failures: report.cleanup_failures,
    }
}
