//! Result sink that writes output files and uploads to the Hub.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use dockinspect_core::types::InspectionResult;
use dockinspect_inspector::{InspectorError, ResultSink};

use crate::hub::HubUploader;

/// File name used when the inspection produced no filename hint.
const FALLBACK_DOCUMENT_NAME: &str = "inspection_bdio.jsonld";

/// What the sink did with the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkOutcome {
    /// Files written or moved into the output directory
    pub written: Vec<PathBuf>,
    pub uploaded: bool,
}

/// Writes the inspection document (and optionally the container filesystem
/// archive) to `output.path`, then uploads the document when a Hub is configured.
pub struct ArtifactSink {
    output_dir: Option<PathBuf>,
    uploader: Option<HubUploader>,
    outcome: Mutex<SinkOutcome>,
}

impl ArtifactSink {
    pub fn new(output_dir: Option<PathBuf>, uploader: Option<HubUploader>) -> Self {
        Self {
            output_dir,
            uploader,
            outcome: Mutex::new(SinkOutcome::default()),
        }
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub async fn outcome(&self) -> SinkOutcome {
        self.outcome.lock().await.clone()
    }

    async fn write_document(
        &self,
        dir: &Path,
        file_name: &str,
        document: &str,
    ) -> Result<PathBuf, InspectorError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| InspectorError::io(dir, e))?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, document)
            .await
            .map_err(|e| InspectorError::io(&path, e))?;
        info!(path = %path.display(), "wrote inspection document");
        Ok(path)
    }
}

impl ResultSink for ArtifactSink {
    async fn accept(
        &self,
        result: &InspectionResult,
        container_filesystem: Option<&Path>,
    ) -> Result<(), InspectorError> {
        let file_name = result
            .source_filename_hints
            .first()
            .map(String::as_str)
            .unwrap_or(FALLBACK_DOCUMENT_NAME);

        if let Some(dir) = &self.output_dir {
            let written = self.write_document(dir, file_name, &result.document).await?;
            self.outcome.lock().await.written.push(written);

            if let Some(source) = container_filesystem {
                if tokio::fs::try_exists(source).await.unwrap_or(false) {
                    let moved = move_into(source, dir).await?;
                    self.outcome.lock().await.written.push(moved);
                } else {
                    warn!(
                        path = %source.display(),
                        "container filesystem archive not found, skipping"
                    );
                }
            }
        } else {
            debug!("output.path not set, document not written");
        }

        if let Some(uploader) = &self.uploader {
            uploader.upload(file_name, &result.document).await?;
            self.outcome.lock().await.uploaded = true;
        }

        Ok(())
    }
}

/// Moves `source` into `dir`, falling back to copy and remove across filesystems.
async fn move_into(source: &Path, dir: &Path) -> Result<PathBuf, InspectorError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| InspectorError::io(source, "path has no file name"))?;
    let dest = dir.join(file_name);

    if tokio::fs::rename(source, &dest).await.is_err() {
        tokio::fs::copy(source, &dest)
            .await
            .map_err(|e| InspectorError::io(&dest, e))?;
        tokio::fs::remove_file(source)
            .await
            .map_err(|e| InspectorError::io(source, e))?;
    }

    info!(from = %source.display(), to = %dest.display(), "moved container filesystem");
    Ok(dest)
}
