//! 서비스 클라이언트 -- 기존 서비스 사용 / 필요 시 서비스 시작
//!
//! 두 전략 모두 아카이브를 공유 디렉토리에 두고 HTTP로 검사를 요청합니다.
//! 서비스에 넘기는 경로는 [`SharedDirMapping`]으로 컨테이너 경로로 바꿉니다.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use dockinspect_core::config::Config;
use dockinspect_core::paths;
use dockinspect_core::types::{
    ContainerSummary, InspectionRequest, InspectionResult, InspectorOs, Target,
};

use super::http::{BdioQuery, ImageInspectorApi};
use super::{archive_file_name, build_request, request_naming};
use crate::docker::DockerClient;
use crate::error::InspectorError;
use crate::health::wait_until_healthy;
use crate::ledger::ResourceLedger;
use crate::lifecycle::{ContainerLifecycle, PreparedArchive};
use crate::translate::SharedDirMapping;

/// 서비스와 공유하는 디렉토리의 준비 작업
#[derive(Debug, Clone)]
pub struct SharedStaging {
    mapping: SharedDirMapping,
    target_dir: PathBuf,
    output_dir: PathBuf,
}

impl SharedStaging {
    pub fn new<D: DockerClient>(lifecycle: &ContainerLifecycle<D>) -> Self {
        let paths = lifecycle.paths();
        Self {
            mapping: SharedDirMapping::from_paths(paths),
            target_dir: paths.shared_target_dir(),
            output_dir: paths.shared_output_dir(),
        }
    }

    pub fn mapping(&self) -> &SharedDirMapping {
        &self.mapping
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 대상을 공유 디렉토리의 아카이브로 준비하고 요청을 만듭니다.
    ///
    /// 아카이브 대상은 엔진 없이 처리합니다. 공유 디렉토리 밖에 있으면
    /// 공유 대상 디렉토리로 복사합니다.
    pub async fn prepare_request<D: DockerClient>(
        &self,
        lifecycle: &ContainerLifecycle<D>,
        target: &Target,
        ledger: &mut ResourceLedger,
    ) -> Result<InspectionRequest, InspectorError> {
        let config = lifecycle.config();
        let prepared = match target {
            Target::Archive { path, .. } => PreparedArchive {
                host_path: self.stage_archive(path, config, ledger).await?,
                image: target.image_ref(),
            },
            _ => {
                lifecycle
                    .prepare_archive(target, &self.target_dir, ledger)
                    .await?
            }
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| InspectorError::io(&self.output_dir, e))?;

        let container_archive = self.mapping.to_container(&prepared.host_path)?;
        let container_output = self.mapping.to_container(&self.output_dir)?;
        Ok(build_request(
            &prepared,
            container_archive,
            &container_output,
            config.cleanup_working_dir,
        ))
    }

    async fn stage_archive(
        &self,
        archive: &Path,
        config: &Config,
        ledger: &mut ResourceLedger,
    ) -> Result<PathBuf, InspectorError> {
        if archive.starts_with(self.mapping.local_root()) {
            return Ok(archive.to_path_buf());
        }

        let staged = self.target_dir.join(archive_file_name(archive)?);
        tokio::fs::create_dir_all(&self.target_dir)
            .await
            .map_err(|e| InspectorError::io(&self.target_dir, e))?;
        if config.cleanup_working_dir {
            ledger.track_temp_file(&staged);
        }
        info!(
            from = %archive.display(),
            to = %staged.display(),
            "copying archive into the shared directory"
        );
        tokio::fs::copy(archive, &staged)
            .await
            .map_err(|e| InspectorError::io(archive, e))?;
        Ok(staged)
    }
}

/// 요청과 설정으로 `getbdio` 질의를 만듭니다.
pub fn bdio_query(request: &InspectionRequest, config: &Config) -> BdioQuery {
    BdioQuery {
        tarfile: request.container_path_to_archive.clone(),
        resulting_container_fs_path: request.container_path_to_output_artifact.clone(),
        cleanup: request.cleanup_requested,
        image_repo: request.image_repo.clone(),
        image_tag: request.image_tag.clone(),
        hub_project_name: config.hub_project_name.clone(),
        hub_project_version: config.hub_project_version.clone(),
        codelocation_prefix: config.hub_codelocation_prefix.clone(),
    }
}

async fn request_document(
    api: &ImageInspectorApi,
    request: &InspectionRequest,
    config: &Config,
) -> Result<InspectionResult, InspectorError> {
    let document = api.get_bdio(&bdio_query(request, config)).await?;
    let (repo, tag) = request_naming(request);
    Ok(InspectionResult {
        document,
        source_filename_hints: vec![paths::bdio_filename(&repo, &tag)],
    })
}

/// 이미 실행 중인 서비스를 사용하는 클라이언트
pub struct ServiceExistingClient<D: DockerClient> {
    lifecycle: ContainerLifecycle<D>,
    shared: SharedStaging,
    api: ImageInspectorApi,
}

impl<D: DockerClient> ServiceExistingClient<D> {
    pub fn new(lifecycle: ContainerLifecycle<D>) -> Result<Self, InspectorError> {
        let config = lifecycle.config();
        let api = ImageInspectorApi::new(
            config.imageinspector_service_url.trim(),
            config.command_timeout(),
        )?;
        Ok(Self {
            shared: SharedStaging::new(&lifecycle),
            lifecycle,
            api,
        })
    }

    pub fn shared(&self) -> &SharedStaging {
        &self.shared
    }

    pub fn api(&self) -> &ImageInspectorApi {
        &self.api
    }

    pub async fn prepare_request(
        &self,
        target: &Target,
        ledger: &mut ResourceLedger,
    ) -> Result<InspectionRequest, InspectorError> {
        self.shared
            .prepare_request(&self.lifecycle, target, ledger)
            .await
    }

    pub async fn get_bdio(
        &self,
        request: &InspectionRequest,
    ) -> Result<InspectionResult, InspectorError> {
        info!(url = self.api.base_url(), "requesting inspection from existing service");
        request_document(&self.api, request, self.lifecycle.config()).await
    }
}

/// 배포판별 서비스를 필요할 때 시작하는 클라이언트
pub struct ServiceOnDemandClient<D: DockerClient> {
    lifecycle: ContainerLifecycle<D>,
    shared: SharedStaging,
    os: InspectorOs,
    api: ImageInspectorApi,
}

impl<D: DockerClient> ServiceOnDemandClient<D> {
    pub fn new(lifecycle: ContainerLifecycle<D>) -> Result<Self, InspectorError> {
        let config = lifecycle.config();
        let os = config.inspector_os_default()?;
        let api = ImageInspectorApi::new(&config.local_service_url(os), config.command_timeout())?;
        Ok(Self {
            shared: SharedStaging::new(&lifecycle),
            lifecycle,
            os,
            api,
        })
    }

    pub fn shared(&self) -> &SharedStaging {
        &self.shared
    }

    pub fn os(&self) -> InspectorOs {
        self.os
    }

    pub async fn prepare_request(
        &self,
        target: &Target,
        ledger: &mut ResourceLedger,
    ) -> Result<InspectionRequest, InspectorError> {
        self.shared
            .prepare_request(&self.lifecycle, target, ledger)
            .await
    }

    /// 서비스가 준비되도록 한 뒤 검사를 요청합니다.
    pub async fn get_bdio(
        &self,
        request: &InspectionRequest,
        ledger: &mut ResourceLedger,
    ) -> Result<InspectionResult, InspectorError> {
        self.ensure_service(ledger).await?;
        request_document(&self.api, request, self.lifecycle.config()).await
    }

    /// 라벨이 맞는 실행 중 서비스가 정상 응답하면 재사용하고, 아니면 새로 시작합니다.
    async fn ensure_service(&self, ledger: &mut ResourceLedger) -> Result<(), InspectorError> {
        if self.api.is_healthy().await {
            let ours = self.lifecycle.find_service_containers(self.os).await?;
            if ours.iter().any(ContainerSummary::is_running) {
                info!(
                    url = self.api.base_url(),
                    os = %self.os,
                    "reusing running image inspector service"
                );
                return Ok(());
            }
            warn!(
                url = self.api.base_url(),
                os = %self.os,
                "service port answers but no labelled service container is running"
            );
        }

        let service = self.lifecycle.start_service(self.os, ledger).await?;
        let config = self.lifecycle.config();
        let interval = Duration::from_millis(config.service_health_interval_ms);
        if let Err(e) = wait_until_healthy(&self.api, config.service_health_retries, interval).await
        {
            warn!(
                container_id = service.container_id.as_str(),
                error = %e,
                "image inspector service did not become healthy"
            );
            self.lifecycle
                .log_container_output(&service.container_id)
                .await;
            return Err(e);
        }
        Ok(())
    }
}
