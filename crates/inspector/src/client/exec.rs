//! 직접 실행 클라이언트
//!
//! 검사기 이미지로 컨테이너를 띄워 그 안에서 검사기를 실행하고,
//! 호스트에 마운트된 출력 디렉토리에서 결과 문서를 읽습니다.

use std::path::Path;

use tracing::{debug, info};

use dockinspect_core::paths::BDIO_SUFFIX;
use dockinspect_core::types::{InspectionRequest, InspectionResult, Target};

use super::{archive_file_name, build_request};
use crate::docker::DockerClient;
use crate::error::InspectorError;
use crate::ledger::ResourceLedger;
use crate::lifecycle::ContainerLifecycle;

/// 직접 실행 전략 클라이언트
pub struct DirectExecClient<D: DockerClient> {
    lifecycle: ContainerLifecycle<D>,
}

impl<D: DockerClient> DirectExecClient<D> {
    pub fn new(lifecycle: ContainerLifecycle<D>) -> Self {
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &ContainerLifecycle<D> {
        &self.lifecycle
    }

    /// 대상을 작업 디렉토리의 아카이브로 준비합니다.
    pub async fn prepare_request(
        &self,
        target: &Target,
        ledger: &mut ResourceLedger,
    ) -> Result<InspectionRequest, InspectorError> {
        let paths = self.lifecycle.paths();
        let prepared = self
            .lifecycle
            .prepare_archive(target, &paths.host_target_dir(), ledger)
            .await?;
        let file_name = archive_file_name(&prepared.host_path)?;

        Ok(build_request(
            &prepared,
            format!("{}/{file_name}", paths.container_target_dir()),
            &paths.container_output_dir(),
            self.lifecycle.config().cleanup_working_dir,
        ))
    }

    /// 컨테이너에서 검사기를 실행하고 생성된 문서를 읽습니다.
    pub async fn get_bdio(
        &self,
        request: &InspectionRequest,
        ledger: &mut ResourceLedger,
    ) -> Result<InspectionResult, InspectorError> {
        let container_id = self.lifecycle.run_direct_exec(request, ledger).await?;
        let output_dir = self.lifecycle.paths().host_output_dir();
        let result = read_output_documents(&output_dir).await?;
        info!(
            container_id = container_id.as_str(),
            documents = result.source_filename_hints.len(),
            "direct execution produced inspection output"
        );
        Ok(result)
    }
}

/// 출력 디렉토리의 `*_bdio.jsonld` 파일을 읽습니다.
///
/// 이름순 첫 파일이 결과 문서이고, 모든 파일 이름이 힌트가 됩니다.
pub(crate) async fn read_output_documents(dir: &Path) -> Result<InspectionResult, InspectorError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| InspectorError::io(dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| InspectorError::io(dir, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(BDIO_SUFFIX) {
            names.push(name);
        }
    }
    names.sort();

    let first = names.first().ok_or_else(|| InspectorError::MissingOutput {
        path: dir.join(format!("*{BDIO_SUFFIX}")).display().to_string(),
    })?;
    let path = dir.join(first);
    debug!(path = %path.display(), "reading inspection document");
    let document = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| InspectorError::io(&path, e))?;

    Ok(InspectionResult {
        document,
        source_filename_hints: names,
    })
}
