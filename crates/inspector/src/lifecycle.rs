//! 컨테이너 수명주기 관리 -- 풀, 저장, 실행, 정리
//!
//! [`ContainerLifecycle`]은 검사 대상을 이미지 아카이브로 만들고, 검사기
//! 컨테이너를 준비하여 실행합니다.
//!
//! - 직접 실행: pull → save → (대상 이미지 삭제) → 이전 컨테이너 정리 →
//!   create/start → 아카이브와 속성 파일 복사 → exec
//! - 서비스 시작: 라벨이 같은 이전 컨테이너 정리 → create/start
//!
//! 생성한 컨테이너는 만들자마자 [`ResourceLedger`]에 기록되므로 이후 단계가
//! 실패해도 오케스트레이터가 정리할 수 있습니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use dockinspect_core::config::Config;
use dockinspect_core::paths::{
    self, APP_LABEL_KEY, CONTAINER_PROGRAM_DIR, OS_LABEL_KEY, ProgramPaths, SERVICE_APP_NAME,
};
use dockinspect_core::types::{
    ContainerSummary, DEFAULT_TAG, ImageRef, InspectionRequest, InspectorOs, ResourceHandle,
    Target,
};

use crate::docker::{ContainerFilter, ContainerSpec, DockerClient};
use crate::error::InspectorError;
use crate::ledger::ResourceLedger;
use crate::properties::HandoffProperties;

/// 검사 서비스 컨테이너로 전달되는 프록시 설정 환경변수
pub const SCAN_CLI_OPTS_ENV: &str = "SCAN_CLI_OPTS";

/// 검사 가능한 형태로 준비된 대상
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedArchive {
    /// 호스트 기준 이미지 아카이브 경로
    pub host_path: PathBuf,
    /// 알려진 경우 대상 이미지
    pub image: Option<ImageRef>,
}

/// 시작된 검사 서비스 컨테이너
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceContainer {
    pub container_id: String,
    pub host_port: u16,
}

/// 컨테이너 수명주기 관리자
pub struct ContainerLifecycle<D: DockerClient> {
    docker: Arc<D>,
    config: Arc<Config>,
    paths: ProgramPaths,
    scan_cli_opts: Option<String>,
}

impl<D: DockerClient> ContainerLifecycle<D> {
    pub fn new(docker: Arc<D>, config: Arc<Config>) -> Self {
        let paths = ProgramPaths::new(&config);
        Self {
            docker,
            config,
            paths,
            scan_cli_opts: std::env::var(SCAN_CLI_OPTS_ENV).ok(),
        }
    }

    /// 프로세스 환경 대신 사용할 `SCAN_CLI_OPTS` 값을 지정합니다.
    pub fn with_scan_cli_opts(mut self, value: Option<String>) -> Self {
        self.scan_cli_opts = value;
        self
    }

    pub fn docker(&self) -> &Arc<D> {
        &self.docker
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn paths(&self) -> &ProgramPaths {
        &self.paths
    }

    // --- 대상 준비 ---

    /// 이미지 ID를 `repo:tag`로 해석한 새 대상을 반환합니다.
    ///
    /// 다른 형태의 대상은 그대로 반환합니다.
    pub async fn resolve_target(&self, target: &Target) -> Result<Target, InspectorError> {
        match target {
            Target::ImageId(id) => Ok(Target::Image(self.resolve_image_id(id).await?)),
            other => Ok(other.clone()),
        }
    }

    async fn resolve_image_id(&self, image_id: &str) -> Result<ImageRef, InspectorError> {
        let tags = self.docker.inspect_image_tags(image_id).await?;
        let first = tags
            .into_iter()
            .find(|t| t != "<none>:<none>")
            .ok_or_else(|| {
                InspectorError::docker_api("resolve image id", image_id, "image has no repo tags")
            })?;
        let image = ImageRef::parse(&first)?;
        info!(image_id = image_id, image = %image, "resolved image id");
        Ok(image)
    }

    /// 대상을 `dest_dir` 아래의 이미지 아카이브로 준비합니다.
    ///
    /// 풀 실패는 경고만 남기고 저장을 시도하며, 저장 실패는 치명적입니다.
    pub async fn prepare_archive(
        &self,
        target: &Target,
        dest_dir: &Path,
        ledger: &mut ResourceLedger,
    ) -> Result<PreparedArchive, InspectorError> {
        let image = match target {
            Target::Archive { path, .. } => {
                return Ok(PreparedArchive {
                    host_path: path.clone(),
                    image: target.image_ref(),
                });
            }
            Target::Image(image) => image.clone(),
            Target::ImageId(id) => self.resolve_image_id(id).await?,
        };

        let local_id = self.pull_target(&image).await;
        let host_path = self.save_image(&image, dest_dir, ledger).await?;

        if self.config.cleanup_target_image {
            let removable = local_id.unwrap_or_else(|| image.to_string());
            info!(image = %image, "removing target image");
            if let Err(e) = self.docker.remove_image(&removable).await {
                warn!(image = %image, error = %e, "failed to remove target image");
            }
        }

        Ok(PreparedArchive {
            host_path,
            image: Some(image),
        })
    }

    /// 이미지를 풀하고 로컬 이미지 ID를 확인합니다. 실패해도 중단하지 않습니다.
    async fn pull_target(&self, image: &ImageRef) -> Option<String> {
        info!(image = %image, "pulling image");
        if let Err(e) = self.docker.pull_image(image).await {
            warn!(
                image = %image,
                error = %e,
                "pull failed; assuming the image is available locally"
            );
            return None;
        }

        match self.find_local_image(image).await {
            Ok(Some(id)) => {
                debug!(image = %image, image_id = id.as_str(), "pulled image found locally");
                Some(id)
            }
            Ok(None) => {
                warn!(image = %image, "pulled image not found in local image list");
                None
            }
            Err(e) => {
                warn!(image = %image, error = %e, "could not verify pulled image");
                None
            }
        }
    }

    /// 로컬 이미지 목록에서 `repo:tag`와 일치하는 이미지 ID를 찾습니다.
    pub async fn find_local_image(
        &self,
        image: &ImageRef,
    ) -> Result<Option<String>, InspectorError> {
        let wanted = image.to_string();
        let images = self.docker.list_images(&image.repo).await?;
        Ok(images
            .into_iter()
            .find(|i| i.repo_tags.iter().any(|t| *t == wanted))
            .map(|i| i.id))
    }

    async fn save_image(
        &self,
        image: &ImageRef,
        dest_dir: &Path,
        ledger: &mut ResourceLedger,
    ) -> Result<PathBuf, InspectorError> {
        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| InspectorError::SaveFailed {
                image: image.to_string(),
                reason: format!("cannot create {}: {e}", dest_dir.display()),
            })?;

        let dest = dest_dir.join(paths::image_archive_filename(&image.repo, &image.tag));
        if self.config.cleanup_working_dir {
            ledger.track_temp_file(&dest);
        }

        info!(image = %image, path = %dest.display(), "saving image");
        self.docker.save_image(image, &dest).await?;
        Ok(dest)
    }

    /// 검사기 이미지가 로컬에 없으면 풀합니다. 실패는 치명적입니다.
    pub async fn ensure_inspector_image(
        &self,
        image: &ImageRef,
        ledger: &mut ResourceLedger,
    ) -> Result<String, InspectorError> {
        let local_id = match self.find_local_image(image).await? {
            Some(id) => id,
            None => {
                info!(image = %image, "inspector image not found locally; pulling");
                self.docker.pull_image(image).await.map_err(|e| {
                    InspectorError::docker_api("pull inspector image", image.to_string(), e)
                })?;
                self.find_local_image(image)
                    .await?
                    .unwrap_or_else(|| image.to_string())
            }
        };

        if self.config.cleanup_inspector_image {
            ledger.track(ResourceHandle::image(local_id));
        }
        Ok(image.to_string())
    }

    // --- 재조정 ---

    /// 이름이 같은 이전 컨테이너를 정지(실행 중이면)하고 삭제합니다.
    ///
    /// 컨테이너가 없으면 아무것도 하지 않으므로 반복 호출해도 안전합니다.
    pub async fn reconcile_by_name(&self, name: &str) -> Result<(), InspectorError> {
        let containers = self
            .docker
            .list_containers(&ContainerFilter::Name(name.to_owned()))
            .await
            .map_err(|e| reconciliation_failed(name, e))?;

        for stale in containers.iter().filter(|c| c.name_contains(name)) {
            self.remove_stale(stale, name).await?;
        }
        Ok(())
    }

    /// `(app, os)` 라벨이 같은 이전 서비스 컨테이너를 정리합니다.
    pub async fn reconcile_by_labels(&self, os: InspectorOs) -> Result<(), InspectorError> {
        let label = format!("{APP_LABEL_KEY}={SERVICE_APP_NAME},{OS_LABEL_KEY}={os}");
        for stale in self
            .find_service_containers(os)
            .await
            .map_err(|e| reconciliation_failed(&label, e))?
        {
            self.remove_stale(&stale, &label).await?;
        }
        Ok(())
    }

    /// 라벨로 서비스 컨테이너를 찾습니다. `os` 값은 대소문자를 구분하지 않습니다.
    pub async fn find_service_containers(
        &self,
        os: InspectorOs,
    ) -> Result<Vec<ContainerSummary>, InspectorError> {
        let filter = ContainerFilter::Label {
            key: APP_LABEL_KEY.to_owned(),
            value: SERVICE_APP_NAME.to_owned(),
        };
        Ok(self
            .docker
            .list_containers(&filter)
            .await?
            .into_iter()
            .filter(|c| {
                c.labels.get(APP_LABEL_KEY).map(String::as_str) == Some(SERVICE_APP_NAME)
                    && c.labels
                        .get(OS_LABEL_KEY)
                        .is_some_and(|v| v.eq_ignore_ascii_case(os.as_str()))
            })
            .collect())
    }

    async fn remove_stale(
        &self,
        stale: &ContainerSummary,
        matched_by: &str,
    ) -> Result<(), InspectorError> {
        debug!(
            container_id = stale.id.as_str(),
            status = stale.status.as_str(),
            matched_by = matched_by,
            "found existing container"
        );
        if stale.is_running() {
            info!(container_id = stale.id.as_str(), "stopping existing container");
            self.docker
                .stop_container(&stale.id, self.config.stop_timeout_secs())
                .await
                .map_err(|e| reconciliation_failed(&stale.id, e))?;
        }
        info!(container_id = stale.id.as_str(), "removing existing container");
        self.docker
            .remove_container(&stale.id)
            .await
            .map_err(|e| reconciliation_failed(&stale.id, e))
    }

    // --- 직접 실행 ---

    /// 직접 실행 컨테이너에서 중첩 검사기를 실행하고 컨테이너 ID를 반환합니다.
    ///
    /// 결과 파일은 호스트의 출력 디렉토리에 마운트되어 있으므로 컨테이너
    /// 정리 결과와 무관하게 유효합니다.
    pub async fn run_direct_exec(
        &self,
        request: &InspectionRequest,
        ledger: &mut ResourceLedger,
    ) -> Result<String, InspectorError> {
        let inspector_image = self
            .ensure_inspector_image(&self.config.exec_inspector_image(), ledger)
            .await?;

        let (repo, _) = naming_key(
            &request.image_repo,
            &request.image_tag,
            &request.host_path_to_archive,
        );
        let name = paths::extractor_container_name(&repo);
        self.reconcile_by_name(&name).await?;

        let output_dir = self.paths.host_output_dir();
        reset_dir(&output_dir).await?;

        let spec = ContainerSpec {
            name: name.clone(),
            image: inspector_image.clone(),
            cmd: vec!["/bin/sh".to_owned()],
            binds: vec![format!(
                "{}:{}",
                output_dir.display(),
                self.paths.container_output_dir()
            )],
            interactive: true,
            ..ContainerSpec::default()
        };

        debug!(container = name.as_str(), image = inspector_image.as_str(), "creating container");
        let id = self.docker.create_container(&spec).await?;
        ledger.track(ResourceHandle::container(&id, &name));
        self.docker.start_container(&id).await?;
        info!(container_id = id.as_str(), container = name.as_str(), "started inspector container");

        self.docker
            .copy_to_container(
                &id,
                &request.host_path_to_archive,
                &self.paths.container_target_dir(),
            )
            .await?;

        let binary = self.config.inspector_binary_path.trim();
        if !binary.is_empty() {
            self.docker
                .copy_to_container(&id, Path::new(binary), CONTAINER_PROGRAM_DIR)
                .await?;
        }

        let props = HandoffProperties::for_nested_run(
            &self.config,
            &request.container_path_to_archive,
            &request.image_repo,
            &request.image_tag,
        );
        let host_props = self.paths.host_property_file();
        props.write_to(&host_props).await?;
        self.docker
            .copy_to_container(&id, &host_props, &self.paths.container_config_dir())
            .await?;

        let cmd = self.nested_command(&request.container_path_to_archive);
        if let Err(e) = self.exec_inspector(&id, &cmd).await {
            self.log_container_output(&id).await;
            return Err(e);
        }
        debug!(
            output_dir = %output_dir.display(),
            "inspector output is in the host output dir"
        );
        Ok(id)
    }

    /// 중첩 검사기 명령줄
    pub fn nested_command(&self, container_archive_path: &str) -> Vec<String> {
        let binary = self.config.inspector_binary_path.trim();
        let program = match Path::new(binary).file_name() {
            Some(file_name) if !binary.is_empty() => {
                format!("{CONTAINER_PROGRAM_DIR}/{}", file_name.to_string_lossy())
            }
            _ => self.config.inspector_command.clone(),
        };

        let mut cmd = vec![program];
        cmd.extend(
            self.config
                .inspector_exec_options
                .split_whitespace()
                .map(str::to_owned),
        );
        cmd.push(format!("--config={}", self.paths.container_property_file()));
        cmd.push(format!("--docker.tar={container_archive_path}"));
        cmd
    }

    async fn exec_inspector(&self, id: &str, cmd: &[String]) -> Result<(), InspectorError> {
        let timeout = self.config.command_timeout();
        info!(
            container_id = id,
            program = cmd.first().map(String::as_str).unwrap_or_default(),
            "running inspector in container"
        );

        let output = match tokio::time::timeout(timeout, self.docker.exec(id, cmd)).await {
            Ok(result) => result?,
            Err(_elapsed) => {
                return Err(InspectorError::ExecFailed {
                    container: id.to_owned(),
                    reason: format!("timed out after {} ms", timeout.as_millis()),
                });
            }
        };

        for line in output.output.lines() {
            debug!(container_id = id, "{line}");
        }

        if output.exit_code != 0 {
            return Err(InspectorError::ExecFailed {
                container: id.to_owned(),
                reason: format!("exited with code {}", output.exit_code),
            });
        }
        debug!(container_id = id, "inspector execution completed");
        Ok(())
    }

    // --- 서비스 ---

    /// 배포판별 검사 서비스 컨테이너를 새로 시작합니다.
    ///
    /// 라벨이 같은 이전 컨테이너는 상태와 무관하게 정리합니다.
    /// 헬스 체크는 호출자의 몫입니다.
    pub async fn start_service(
        &self,
        os: InspectorOs,
        ledger: &mut ResourceLedger,
    ) -> Result<ServiceContainer, InspectorError> {
        let image = self
            .ensure_inspector_image(&self.config.service_image(os), ledger)
            .await?;
        self.reconcile_by_labels(os).await?;

        let shared = self.paths.shared_local_dir();
        tokio::fs::create_dir_all(shared)
            .await
            .map_err(|e| InspectorError::io(shared, e))?;

        let name = paths::service_container_name(os);
        let container_port = self.config.service_container_port(os);
        let host_port = self.config.service_host_port(os);
        let spec = ContainerSpec {
            name: name.clone(),
            image,
            cmd: self.service_command(os),
            labels: paths::service_labels(os),
            binds: vec![format!(
                "{}:{}",
                shared.display(),
                self.paths.shared_container_dir()
            )],
            port_bindings: vec![(container_port, host_port)],
            env: self.service_env(),
            interactive: false,
        };

        info!(
            container = name.as_str(),
            os = %os,
            container_port = container_port,
            host_port = host_port,
            "starting image inspector service"
        );
        let id = self.docker.create_container(&spec).await?;
        self.track_service_container(
            ledger,
            ResourceHandle::container(&id, &name).with_labels(spec.labels.clone()),
        );
        self.docker.start_container(&id).await?;

        Ok(ServiceContainer {
            container_id: id,
            host_port,
        })
    }

    /// 서비스 컨테이너 명령줄 인자
    pub fn service_command(&self, os: InspectorOs) -> Vec<String> {
        let mut cmd = vec![
            format!("--server.port={}", self.config.service_container_port(os)),
            format!("--current.linux.distro={os}"),
        ];
        for other in InspectorOs::ALL {
            cmd.push(format!(
                "--inspector.url.{other}={}",
                self.config.local_service_url(other)
            ));
        }
        cmd
    }

    /// 서비스 컨테이너 환경변수. 프록시 호스트가 설정되어 있으면 전달하지 않습니다.
    pub fn service_env(&self) -> Vec<String> {
        match &self.scan_cli_opts {
            Some(opts) if self.config.hub_proxy_host.trim().is_empty() && !opts.trim().is_empty() => {
                vec![format!("{SCAN_CLI_OPTS_ENV}={opts}")]
            }
            _ => Vec::new(),
        }
    }

    // --- 공통 ---

    /// 서비스 컨테이너는 `cleanup.inspector.container`가 꺼져 있으면 다음 실행이
    /// 라벨로 찾아 쓰도록 남겨 둡니다. 직접 실행 컨테이너는 항상 정리합니다.
    fn track_service_container(&self, ledger: &mut ResourceLedger, handle: ResourceHandle) {
        if self.config.cleanup_inspector_container {
            ledger.track(handle);
        } else {
            info!(resource = %handle, "container will be left in place after the run");
        }
    }

    /// 컨테이너 로그를 debug 레벨로 남깁니다. 실패는 무시합니다.
    pub async fn log_container_output(&self, id: &str) {
        match self.docker.container_logs(id).await {
            Ok(log) => debug!(container_id = id, log = log.as_str(), "container log"),
            Err(e) => debug!(container_id = id, error = %e, "could not fetch container log"),
        }
    }
}

fn reconciliation_failed(container: &str, err: InspectorError) -> InspectorError {
    InspectorError::ContainerReconciliationFailed {
        container: container.to_owned(),
        reason: err.to_string(),
    }
}

/// 파일과 컨테이너 이름을 만들 `(repo, tag)`.
///
/// 이미지를 모르는 아카이브 대상은 파일 이름과 기본 태그를 씁니다.
pub fn naming_key(image_repo: &str, image_tag: &str, archive: &Path) -> (String, String) {
    if !image_repo.is_empty() {
        let tag = if image_tag.is_empty() { DEFAULT_TAG } else { image_tag };
        return (image_repo.to_owned(), tag.to_owned());
    }
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned());
    (stem, DEFAULT_TAG.to_owned())
}

/// 이전 실행이 남긴 파일이 결과로 오인되지 않도록 디렉토리를 비웁니다.
async fn reset_dir(dir: &Path) -> Result<(), InspectorError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(InspectorError::io(dir, e)),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| InspectorError::io(dir, e))
}
