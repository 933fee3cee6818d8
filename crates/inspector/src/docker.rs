//! Docker API abstraction for testability.
//!
//! The [`DockerClient`] trait is the resource-handle control surface: every
//! image and container operation the lifecycle manager needs goes through it.
//! Production code uses [`BollardDockerClient`]; tests use `MockDockerClient`.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ ContainerLifecycle │
//! └─────────┬──────────┘
//!           │
//!           ▼
//!    ┌─────────────┐
//!    │DockerClient │ (trait)
//!    └─────────────┘
//!        │      │
//!        ▼      ▼
//!   ┌───────┐ ┌────┐
//!   │Bollard│ │Mock│
//!   └───┬───┘ └────┘
//!       │
//!       ▼
//!   Docker Engine
//! ```
//!
//! # Error mapping
//!
//! - `ping` failures become [`InspectorError::EngineUnavailable`]
//! - pull / save / image removal / log failures get their own variants so
//!   callers can apply the best-effort policy
//! - everything else is [`InspectorError::DockerApi`] with the operation name

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use dockinspect_core::types::{ContainerSummary, ImageRef, ImageSummary};

use crate::error::InspectorError;

/// Server-side filter for container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerFilter {
    /// Containers whose name contains the given string.
    Name(String),
    /// Containers carrying `key=value`.
    Label { key: String, value: String },
}

/// Everything needed to create a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub cmd: Vec<String>,
    pub labels: HashMap<String, String>,
    /// `host_path:container_path` bind mounts.
    pub binds: Vec<String>,
    /// `(container_port, host_port)` TCP bindings.
    pub port_bindings: Vec<(u16, u16)>,
    /// `KEY=value` assignments.
    pub env: Vec<String>,
    /// Keep stdin open with a TTY so an idle shell stays up for `exec`.
    pub interactive: bool,
}

/// Result of a finished exec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i64,
    /// Combined stdout/stderr.
    pub output: String,
}

/// Trait abstracting container engine operations.
///
/// The trait is `Send + Sync + 'static`, allowing safe sharing across async contexts.
///
/// # Implementations
///
/// - [`BollardDockerClient`]: Production implementation using the `bollard` library
/// - `MockDockerClient`: Recording test implementation (available in tests only)
pub trait DockerClient: Send + Sync + 'static {
    /// Checks engine connectivity.
    ///
    /// # Errors
    ///
    /// Returns `InspectorError::EngineUnavailable` if the engine is unreachable.
    fn ping(&self) -> impl Future<Output = Result<(), InspectorError>> + Send;

    /// Returns the engine's server version string.
    fn engine_version(&self) -> impl Future<Output = Result<String, InspectorError>> + Send;

    /// Pulls `repo:tag` from its registry.
    ///
    /// # Errors
    ///
    /// Returns `InspectorError::PullFailed`; callers decide whether that is fatal.
    fn pull_image(
        &self,
        image: &ImageRef,
    ) -> impl Future<Output = Result<(), InspectorError>> + Send;

    /// Lists local images of a repository.
    fn list_images(
        &self,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<ImageSummary>, InspectorError>> + Send;

    /// Returns the repo tags of a local image.
    fn inspect_image_tags(
        &self,
        image_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, InspectorError>> + Send;

    /// Exports `repo:tag` as an image archive at `dest`.
    ///
    /// # Errors
    ///
    /// Returns `InspectorError::SaveFailed`.
    fn save_image(
        &self,
        image: &ImageRef,
        dest: &Path,
    ) -> impl Future<Output = Result<(), InspectorError>> + Send;

    /// Removes a local image by id or name.
    ///
    /// # Errors
    ///
    /// Returns `InspectorError::ImageRemovalFailed`.
    fn remove_image(&self, image: &str) -> impl Future<Output = Result<(), InspectorError>> + Send;

    /// Lists all containers (running or not) matching the filter.
    fn list_containers(
        &self,
        filter: &ContainerFilter,
    ) -> impl Future<Output = Result<Vec<ContainerSummary>, InspectorError>> + Send;

    /// Creates a container and returns its id.
    fn create_container(
        &self,
        spec: &ContainerSpec,
    ) -> impl Future<Output = Result<String, InspectorError>> + Send;

    fn start_container(&self, id: &str) -> impl Future<Output = Result<(), InspectorError>> + Send;

    /// Stops a container, killing it after `timeout_secs`.
    fn stop_container(
        &self,
        id: &str,
        timeout_secs: i64,
    ) -> impl Future<Output = Result<(), InspectorError>> + Send;

    fn remove_container(&self, id: &str)
    -> impl Future<Output = Result<(), InspectorError>> + Send;

    /// Copies a host file into `container_dir` (created if missing).
    fn copy_to_container(
        &self,
        id: &str,
        host_path: &Path,
        container_dir: &str,
    ) -> impl Future<Output = Result<(), InspectorError>> + Send;

    /// Runs `cmd` inside the container and waits for it to exit.
    fn exec(
        &self,
        id: &str,
        cmd: &[String],
    ) -> impl Future<Output = Result<ExecOutput, InspectorError>> + Send;

    /// Fetches the full stdout/stderr log of a container.
    ///
    /// # Errors
    ///
    /// Returns `InspectorError::ContainerLogFetchFailed`.
    fn container_logs(&self, id: &str)
    -> impl Future<Output = Result<String, InspectorError>> + Send;
}

/// Builds an in-memory tar holding one file at `container_dir/<file name>`.
///
/// Entry paths are relative to `/` so the engine creates missing parent
/// directories on extraction.
pub fn single_file_archive(host_path: &Path, container_dir: &str) -> Result<Vec<u8>, InspectorError> {
    let file_name = host_path
        .file_name()
        .ok_or_else(|| InspectorError::io(host_path, "path has no file name"))?;
    let entry_path = Path::new(container_dir.trim_start_matches('/')).join(file_name);

    let mut builder = tar::Builder::new(Vec::new());
    builder
        .append_path_with_name(host_path, &entry_path)
        .map_err(|e| InspectorError::io(host_path, e))?;
    builder
        .into_inner()
        .map_err(|e| InspectorError::io(host_path, e))
}

fn is_not_found(err: &bollard::errors::Error) -> bool {
    matches!(
        err,
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

/// Production Docker client implementation using `bollard`.
///
/// Internally uses `Arc<bollard::Docker>` for safe sharing across async tasks.
pub struct BollardDockerClient {
    docker: Arc<bollard::Docker>,
}

impl BollardDockerClient {
    /// Connects to the engine using the platform's default local socket
    /// (or `DOCKER_HOST`).
    ///
    /// # Errors
    ///
    /// Returns `InspectorError::EngineUnavailable` if the client cannot be built.
    pub fn connect_local() -> Result<Self, InspectorError> {
        let docker = bollard::Docker::connect_with_local_defaults().map_err(|e| {
            InspectorError::EngineUnavailable(format!("failed to connect to docker: {e}"))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects to the engine using a specific socket path.
    pub fn connect_with_socket(socket_path: &str) -> Result<Self, InspectorError> {
        let docker =
            bollard::Docker::connect_with_socket(socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| {
                    InspectorError::EngineUnavailable(format!(
                        "failed to connect to docker at {socket_path}: {e}"
                    ))
                })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }
}

impl DockerClient for BollardDockerClient {
    async fn ping(&self) -> Result<(), InspectorError> {
        self.docker
            .ping()
            .await
            .map_err(|e| InspectorError::EngineUnavailable(format!("ping failed: {e}")))?;
        Ok(())
    }

    async fn engine_version(&self) -> Result<String, InspectorError> {
        let info = self
            .docker
            .info()
            .await
            .map_err(|e| InspectorError::EngineUnavailable(format!("info failed: {e}")))?;
        Ok(info.server_version.unwrap_or_else(|| "Unknown".to_owned()))
    }

    async fn pull_image(&self, image: &ImageRef) -> Result<(), InspectorError> {
        use bollard::image::CreateImageOptions;

        let options = CreateImageOptions {
            from_image: image.repo.as_str(),
            tag: image.tag.as_str(),
            ..Default::default()
        };

        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(progress) = stream.next().await {
            let info = progress.map_err(|e| InspectorError::PullFailed {
                image: image.to_string(),
                reason: e.to_string(),
            })?;
            if let Some(status) = info.status {
                debug!(image = %image, status = status.as_str(), "pull progress");
            }
        }
        Ok(())
    }

    async fn list_images(&self, repo: &str) -> Result<Vec<ImageSummary>, InspectorError> {
        use bollard::image::ListImagesOptions;

        let filters = HashMap::from([("reference".to_owned(), vec![repo.to_owned()])]);
        let images = self
            .docker
            .list_images(Some(ListImagesOptions::<String> {
                filters,
                ..Default::default()
            }))
            .await
            .map_err(|e| InspectorError::docker_api("list images", repo, e))?;

        Ok(images
            .into_iter()
            .map(|image| ImageSummary {
                id: image.id,
                repo_tags: image.repo_tags,
            })
            .collect())
    }

    async fn inspect_image_tags(&self, image_id: &str) -> Result<Vec<String>, InspectorError> {
        let details = self
            .docker
            .inspect_image(image_id)
            .await
            .map_err(|e| InspectorError::docker_api("inspect image", image_id, e))?;
        Ok(details.repo_tags.unwrap_or_default())
    }

    async fn save_image(&self, image: &ImageRef, dest: &Path) -> Result<(), InspectorError> {
        let save_failed = |reason: String| InspectorError::SaveFailed {
            image: image.to_string(),
            reason,
        };

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| save_failed(format!("cannot create {}: {e}", dest.display())))?;

        let name = image.to_string();
        let mut stream = self.docker.export_image(&name);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| save_failed(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| save_failed(format!("cannot write {}: {e}", dest.display())))?;
        }
        file.flush()
            .await
            .map_err(|e| save_failed(format!("cannot flush {}: {e}", dest.display())))?;
        Ok(())
    }

    async fn remove_image(&self, image: &str) -> Result<(), InspectorError> {
        self.docker
            .remove_image(image, None, None)
            .await
            .map_err(|e| InspectorError::ImageRemovalFailed {
                image: image.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn list_containers(
        &self,
        filter: &ContainerFilter,
    ) -> Result<Vec<ContainerSummary>, InspectorError> {
        use bollard::container::ListContainersOptions;

        let (filters, target) = match filter {
            ContainerFilter::Name(name) => (
                HashMap::from([("name".to_owned(), vec![name.clone()])]),
                name.clone(),
            ),
            ContainerFilter::Label { key, value } => {
                let label = format!("{key}={value}");
                (
                    HashMap::from([("label".to_owned(), vec![label.clone()])]),
                    label,
                )
            }
        };

        let options = ListContainersOptions::<String> {
            all: true,
            filters,
            ..Default::default()
        };

        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| InspectorError::docker_api("list containers", target, e))?;

        Ok(containers
            .into_iter()
            .map(|c| ContainerSummary {
                id: c.id.unwrap_or_default(),
                names: c.names.unwrap_or_default(),
                labels: c.labels.unwrap_or_default(),
                status: c.status.unwrap_or_default(),
                state: c.state.unwrap_or_default(),
            })
            .collect())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, InspectorError> {
        use bollard::container::{Config, CreateContainerOptions};
        use bollard::models::{HostConfig, PortBinding};

        let exposed_ports: HashMap<String, HashMap<(), ()>> = spec
            .port_bindings
            .iter()
            .map(|(container_port, _)| (format!("{container_port}/tcp"), HashMap::new()))
            .collect();
        let port_bindings: HashMap<String, Option<Vec<PortBinding>>> = spec
            .port_bindings
            .iter()
            .map(|(container_port, host_port)| {
                (
                    format!("{container_port}/tcp"),
                    Some(vec![PortBinding {
                        host_ip: None,
                        host_port: Some(host_port.to_string()),
                    }]),
                )
            })
            .collect();

        let config = Config {
            image: Some(spec.image.clone()),
            cmd: (!spec.cmd.is_empty()).then(|| spec.cmd.clone()),
            labels: (!spec.labels.is_empty()).then(|| spec.labels.clone()),
            env: (!spec.env.is_empty()).then(|| spec.env.clone()),
            exposed_ports: (!exposed_ports.is_empty()).then_some(exposed_ports),
            tty: Some(spec.interactive),
            open_stdin: Some(spec.interactive),
            host_config: Some(HostConfig {
                binds: (!spec.binds.is_empty()).then(|| spec.binds.clone()),
                port_bindings: (!port_bindings.is_empty()).then_some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: spec.name.as_str(),
            platform: None,
        };

        let response = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| InspectorError::docker_api("create container", &spec.name, e))?;
        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), InspectorError> {
        use bollard::container::StartContainerOptions;

        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| InspectorError::docker_api("start container", id, e))
    }

    async fn stop_container(&self, id: &str, timeout_secs: i64) -> Result<(), InspectorError> {
        use bollard::container::StopContainerOptions;

        match self
            .docker
            .stop_container(id, Some(StopContainerOptions { t: timeout_secs }))
            .await
        {
            Ok(()) => Ok(()),
            // 304: already stopped
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(e) => Err(InspectorError::docker_api("stop container", id, e)),
        }
    }

    async fn remove_container(&self, id: &str) -> Result<(), InspectorError> {
        use bollard::container::RemoveContainerOptions;

        match self
            .docker
            .remove_container(
                id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => {
                debug!(container_id = id, "container already removed");
                Ok(())
            }
            Err(e) => Err(InspectorError::docker_api("remove container", id, e)),
        }
    }

    async fn copy_to_container(
        &self,
        id: &str,
        host_path: &Path,
        container_dir: &str,
    ) -> Result<(), InspectorError> {
        use bollard::container::UploadToContainerOptions;

        let owned_path = host_path.to_path_buf();
        let owned_dir = container_dir.to_owned();
        let archive =
            tokio::task::spawn_blocking(move || single_file_archive(&owned_path, &owned_dir))
                .await
                .map_err(|e| InspectorError::io(host_path, e))??;

        debug!(
            container_id = id,
            src = %host_path.display(),
            dest = container_dir,
            "copying file into container"
        );
        self.docker
            .upload_to_container(
                id,
                Some(UploadToContainerOptions {
                    path: "/".to_owned(),
                    ..Default::default()
                }),
                Bytes::from(archive),
            )
            .await
            .map_err(|e| {
                InspectorError::docker_api(
                    "copy to container",
                    format!("{id}:{container_dir}"),
                    e,
                )
            })
    }

    async fn exec(&self, id: &str, cmd: &[String]) -> Result<ExecOutput, InspectorError> {
        use bollard::exec::{CreateExecOptions, StartExecResults};

        let exec = self
            .docker
            .create_exec(
                id,
                CreateExecOptions {
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    cmd: Some(cmd.to_vec()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| InspectorError::docker_api("create exec", id, e))?;

        let mut output = String::new();
        match self
            .docker
            .start_exec(&exec.id, None)
            .await
            .map_err(|e| InspectorError::docker_api("start exec", id, e))?
        {
            StartExecResults::Attached {
                output: mut stream, ..
            } => {
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| InspectorError::docker_api("exec output", id, e))?;
                    output.push_str(&chunk.to_string());
                }
            }
            StartExecResults::Detached => {}
        }

        let inspected = self
            .docker
            .inspect_exec(&exec.id)
            .await
            .map_err(|e| InspectorError::docker_api("inspect exec", id, e))?;

        Ok(ExecOutput {
            exit_code: inspected.exit_code.unwrap_or(-1),
            output,
        })
    }

    async fn container_logs(&self, id: &str) -> Result<String, InspectorError> {
        use bollard::container::LogsOptions;

        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: "all".to_owned(),
            ..Default::default()
        };

        let mut log = String::new();
        let mut stream = self.docker.logs(id, Some(options));
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| InspectorError::ContainerLogFetchFailed {
                container: id.to_owned(),
                reason: e.to_string(),
            })?;
            log.push_str(&chunk.to_string());
        }
        Ok(log)
    }
}

/// 테스트용 Mock Docker 클라이언트
///
/// 모든 호출을 `"operation target"` 형식으로 기록하고, 생성된 컨테이너를
/// 메모리에 유지하여 정리 여부를 검증할 수 있게 합니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockDockerClient {
    /// 현재 존재하는 컨테이너
    pub containers: tokio::sync::Mutex<Vec<ContainerSummary>>,
    /// 로컬 이미지
    pub images: tokio::sync::Mutex<Vec<ImageSummary>>,
    /// 호출 기록
    pub calls: tokio::sync::Mutex<Vec<String>>,
    pub fail_ping: bool,
    pub fail_pull: bool,
    pub fail_save: bool,
    pub fail_stop_container: bool,
    pub fail_remove_container: bool,
    pub fail_remove_image: bool,
    /// exec 결과 종료 코드
    pub exec_exit_code: i64,
    /// exec 시 호스트에 기록할 파일 (중첩 검사기의 출력 흉내)
    pub exec_writes: Option<(std::path::PathBuf, String)>,
    /// exec가 끝나기까지 걸리는 시간
    pub exec_delay: Option<std::time::Duration>,
}

#[cfg(test)]
impl MockDockerClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_containers(self, containers: Vec<ContainerSummary>) -> Self {
        Self {
            containers: tokio::sync::Mutex::new(containers),
            ..self
        }
    }

    pub fn with_images(self, images: Vec<ImageSummary>) -> Self {
        Self {
            images: tokio::sync::Mutex::new(images),
            ..self
        }
    }

    pub fn with_failing_pull(mut self) -> Self {
        self.fail_pull = true;
        self
    }

    pub fn with_failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub fn with_exec_exit_code(mut self, code: i64) -> Self {
        self.exec_exit_code = code;
        self
    }

    pub fn with_exec_delay(mut self, delay: std::time::Duration) -> Self {
        self.exec_delay = Some(delay);
        self
    }

    pub fn with_exec_output_file(mut self, path: std::path::PathBuf, content: &str) -> Self {
        self.exec_writes = Some((path, content.to_owned()));
        self
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: impl Into<String>) {
        self.calls.lock().await.push(call.into());
    }
}

#[cfg(test)]
impl DockerClient for MockDockerClient {
    async fn ping(&self) -> Result<(), InspectorError> {
        self.record("ping").await;
        if self.fail_ping {
            return Err(InspectorError::EngineUnavailable("mock failure".to_owned()));
        }
        Ok(())
    }

    async fn engine_version(&self) -> Result<String, InspectorError> {
        Ok("24.0.0-mock".to_owned())
    }

    async fn pull_image(&self, image: &ImageRef) -> Result<(), InspectorError> {
        self.record(format!("pull {image}")).await;
        if self.fail_pull {
            return Err(InspectorError::PullFailed {
                image: image.to_string(),
                reason: "mock not found".to_owned(),
            });
        }
        let mut images = self.images.lock().await;
        if !images
            .iter()
            .any(|i| i.repo_tags.contains(&image.to_string()))
        {
            images.push(ImageSummary {
                id: format!("sha256:{}", image.repo.replace('/', "")),
                repo_tags: vec![image.to_string()],
            });
        }
        Ok(())
    }

    async fn list_images(&self, repo: &str) -> Result<Vec<ImageSummary>, InspectorError> {
        let prefix = format!("{repo}:");
        Ok(self
            .images
            .lock()
            .await
            .iter()
            .filter(|i| i.repo_tags.iter().any(|t| t.starts_with(&prefix)))
            .cloned()
            .collect())
    }

    async fn inspect_image_tags(&self, image_id: &str) -> Result<Vec<String>, InspectorError> {
        self.images
            .lock()
            .await
            .iter()
            .find(|i| i.id == image_id)
            .map(|i| i.repo_tags.clone())
            .ok_or_else(|| InspectorError::docker_api("inspect image", image_id, "404"))
    }

    async fn save_image(&self, image: &ImageRef, dest: &Path) -> Result<(), InspectorError> {
        self.record(format!("save {image}")).await;
        if self.fail_save {
            return Err(InspectorError::SaveFailed {
                image: image.to_string(),
                reason: "mock no such image".to_owned(),
            });
        }
        tokio::fs::write(dest, b"mock image archive")
            .await
            .map_err(|e| InspectorError::io(dest, e))
    }

    async fn remove_image(&self, image: &str) -> Result<(), InspectorError> {
        self.record(format!("remove_image {image}")).await;
        if self.fail_remove_image {
            return Err(InspectorError::ImageRemovalFailed {
                image: image.to_owned(),
                reason: "mock conflict".to_owned(),
            });
        }
        Ok(())
    }

    async fn list_containers(
        &self,
        filter: &ContainerFilter,
    ) -> Result<Vec<ContainerSummary>, InspectorError> {
        let containers = self.containers.lock().await;
        Ok(containers
            .iter()
            .filter(|c| match filter {
                ContainerFilter::Name(name) => c.name_contains(name),
                ContainerFilter::Label { key, value } => c.labels.get(key) == Some(value),
            })
            .cloned()
            .collect())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, InspectorError> {
        self.record(format!("create {}", spec.name)).await;
        let mut containers = self.containers.lock().await;
        let id = format!("{:012x}", containers.len() + 1);
        containers.push(ContainerSummary {
            id: id.clone(),
            names: vec![format!("/{}", spec.name)],
            labels: spec.labels.clone(),
            status: "Created".to_owned(),
            state: "created".to_owned(),
        });
        Ok(id)
    }

    async fn start_container(&self, id: &str) -> Result<(), InspectorError> {
        self.record(format!("start {id}")).await;
        let mut containers = self.containers.lock().await;
        let container = containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| InspectorError::docker_api("start container", id, "404"))?;
        container.state = "running".to_owned();
        container.status = "Up 1 second".to_owned();
        Ok(())
    }

    async fn stop_container(&self, id: &str, _timeout_secs: i64) -> Result<(), InspectorError> {
        self.record(format!("stop {id}")).await;
        if self.fail_stop_container {
            return Err(InspectorError::docker_api("stop container", id, "mock failure"));
        }
        let mut containers = self.containers.lock().await;
        if let Some(container) = containers.iter_mut().find(|c| c.id == id) {
            container.state = "exited".to_owned();
            container.status = "Exited (0) 1 second ago".to_owned();
        }
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<(), InspectorError> {
        self.record(format!("remove {id}")).await;
        if self.fail_remove_container {
            return Err(InspectorError::docker_api("remove container", id, "mock failure"));
        }
        self.containers.lock().await.retain(|c| c.id != id);
        Ok(())
    }

    async fn copy_to_container(
        &self,
        id: &str,
        host_path: &Path,
        container_dir: &str,
    ) -> Result<(), InspectorError> {
        let file_name = host_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(format!("copy {file_name} {id}:{container_dir}"))
            .await;
        Ok(())
    }

    async fn exec(&self, id: &str, cmd: &[String]) -> Result<ExecOutput, InspectorError> {
        self.record(format!("exec {id} {}", cmd.join(" "))).await;
        if let Some(delay) = self.exec_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((path, content)) = &self.exec_writes {
            tokio::fs::write(path, content)
                .await
                .map_err(|e| InspectorError::io(path, e))?;
        }
        Ok(ExecOutput {
            exit_code: self.exec_exit_code,
            output: "mock inspector output".to_owned(),
        })
    }

    async fn container_logs(&self, id: &str) -> Result<String, InspectorError> {
        self.record(format!("logs {id}")).await;
        Ok("mock log".to_owned())
    }
}
