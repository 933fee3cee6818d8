//! 검사 클라이언트 -- 전략별 검사 문서 생성
//!
//! 세 가지 전략이 같은 계약을 구현합니다.
//!
//! 1. `prepare_request`: 대상을 검사 백엔드가 읽을 수 있는 아카이브로 준비하고
//!    [`InspectionRequest`]를 만듭니다.
//! 2. `get_bdio`: 요청을 실행하여 [`InspectionResult`]를 반환합니다.
//!
//! 직접 실행은 컨테이너 안에서 검사기를 실행하고, 두 서비스 전략은 HTTP로
//! 검사 서비스를 호출합니다. 직접 실행 컨테이너 안의 중첩 실행은
//! [`LocalInspector`]로 아카이브를 바로 검사합니다.

pub mod exec;
pub mod http;
pub mod local;
pub mod service;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dockinspect_core::config::Config;
use dockinspect_core::paths;
use dockinspect_core::types::{InspectionRequest, InspectionResult, Target};

use crate::docker::DockerClient;
use crate::error::InspectorError;
use crate::ledger::ResourceLedger;
use crate::lifecycle::{ContainerLifecycle, PreparedArchive, naming_key};
use crate::strategy::Strategy;

pub use exec::DirectExecClient;
pub use http::{BdioQuery, ImageInspectorApi};
pub use local::LocalInspector;
pub use service::{ServiceExistingClient, ServiceOnDemandClient, SharedStaging};

/// 전략별 검사 클라이언트
pub enum InspectionClient<D: DockerClient> {
    DirectExec(DirectExecClient<D>),
    ServiceOnDemand(ServiceOnDemandClient<D>),
    ServiceExisting(ServiceExistingClient<D>),
}

impl<D: DockerClient> InspectionClient<D> {
    /// 선택된 전략의 클라이언트를 생성합니다.
    pub fn for_strategy(
        strategy: Strategy,
        docker: Arc<D>,
        config: Arc<Config>,
    ) -> Result<Self, InspectorError> {
        let lifecycle = ContainerLifecycle::new(docker, config);
        Ok(match strategy {
            Strategy::DirectExec => Self::DirectExec(DirectExecClient::new(lifecycle)),
            Strategy::ServiceOnDemand => {
                Self::ServiceOnDemand(ServiceOnDemandClient::new(lifecycle)?)
            }
            Strategy::ServiceExisting => {
                Self::ServiceExisting(ServiceExistingClient::new(lifecycle)?)
            }
        })
    }

    /// 설정에서 전략을 골라 클라이언트를 생성합니다.
    pub fn select(docker: Arc<D>, config: Arc<Config>) -> Result<Self, InspectorError> {
        let strategy = crate::strategy::select(&config)?;
        Self::for_strategy(strategy, docker, config)
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Self::DirectExec(_) => Strategy::DirectExec,
            Self::ServiceOnDemand(_) => Strategy::ServiceOnDemand,
            Self::ServiceExisting(_) => Strategy::ServiceExisting,
        }
    }

    /// 이 대상을 검사하는 데 컨테이너 엔진이 필요한지 확인합니다.
    ///
    /// 기존 서비스에 이미 내보낸 아카이브를 넘기는 경우에만 엔진이 필요 없습니다.
    pub fn needs_engine(&self, target: &Target) -> bool {
        match self {
            Self::DirectExec(_) | Self::ServiceOnDemand(_) => true,
            Self::ServiceExisting(_) => !matches!(target, Target::Archive { .. }),
        }
    }

    pub async fn prepare_request(
        &self,
        target: &Target,
        ledger: &mut ResourceLedger,
    ) -> Result<InspectionRequest, InspectorError> {
        match self {
            Self::DirectExec(client) => client.prepare_request(target, ledger).await,
            Self::ServiceOnDemand(client) => client.prepare_request(target, ledger).await,
            Self::ServiceExisting(client) => client.prepare_request(target, ledger).await,
        }
    }

    pub async fn get_bdio(
        &self,
        request: &InspectionRequest,
        ledger: &mut ResourceLedger,
    ) -> Result<InspectionResult, InspectorError> {
        match self {
            Self::DirectExec(client) => client.get_bdio(request, ledger).await,
            Self::ServiceOnDemand(client) => client.get_bdio(request, ledger).await,
            Self::ServiceExisting(client) => client.get_bdio(request).await,
        }
    }

    /// 컨테이너 파일시스템 아카이브가 생성될 호스트 경로
    pub fn container_filesystem_path(&self, request: &InspectionRequest) -> PathBuf {
        let (repo, tag) = request_naming(request);
        let file_name = paths::container_filesystem_filename(&repo, &tag);
        match self {
            Self::DirectExec(client) => client
                .lifecycle()
                .paths()
                .host_output_dir()
                .join(file_name),
            Self::ServiceOnDemand(client) => client.shared().output_dir().join(file_name),
            Self::ServiceExisting(client) => client.shared().output_dir().join(file_name),
        }
    }
}

/// 요청의 이름 규칙용 `(repo, tag)`
pub(crate) fn request_naming(request: &InspectionRequest) -> (String, String) {
    naming_key(
        &request.image_repo,
        &request.image_tag,
        &request.host_path_to_archive,
    )
}

/// 준비된 아카이브와 컨테이너 측 경로로 요청을 만듭니다.
pub(crate) fn build_request(
    prepared: &PreparedArchive,
    container_path_to_archive: String,
    container_output_dir: &str,
    cleanup_requested: bool,
) -> InspectionRequest {
    let (image_repo, image_tag) = prepared
        .image
        .as_ref()
        .map(|i| (i.repo.clone(), i.tag.clone()))
        .unwrap_or_default();
    let (repo, tag) = naming_key(&image_repo, &image_tag, &prepared.host_path);
    InspectionRequest {
        host_path_to_archive: prepared.host_path.clone(),
        container_path_to_archive,
        image_repo,
        image_tag,
        container_path_to_output_artifact: format!(
            "{}/{}",
            container_output_dir.trim_end_matches('/'),
            paths::container_filesystem_filename(&repo, &tag)
        ),
        cleanup_requested,
    }
}

pub(crate) fn archive_file_name(path: &Path) -> Result<String, InspectorError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| InspectorError::io(path, "archive path has no file name"))
}

#[cfg(test)]
mod tests {
    use dockinspect_core::types::ImageRef;

    use super::*;
    use crate::docker::MockDockerClient;

    fn client(config: Config) -> InspectionClient<MockDockerClient> {
        InspectionClient::select(Arc::new(MockDockerClient::new()), Arc::new(config)).unwrap()
    }

    #[test]
    fn select_builds_matching_variant() {
        assert_eq!(client(Config::default()).strategy(), Strategy::DirectExec);
        let on_demand = Config {
            imageinspector_service_start: true,
            ..Config::default()
        };
        assert_eq!(client(on_demand).strategy(), Strategy::ServiceOnDemand);
        let existing = Config {
            imageinspector_service_url: "http://localhost:9000".to_owned(),
            ..Config::default()
        };
        assert_eq!(client(existing).strategy(), Strategy::ServiceExisting);
    }

    #[test]
    fn existing_service_with_archive_needs_no_engine() {
        let existing = client(Config {
            imageinspector_service_url: "http://localhost:9000".to_owned(),
            ..Config::default()
        });
        let archive = Target::Archive {
            path: PathBuf::from("/tmp/ghost.tar"),
            repo: Some("ghost".to_owned()),
            tag: Some("1.0".to_owned()),
        };
        assert!(!existing.needs_engine(&archive));
        assert!(existing.needs_engine(&Target::Image(ImageRef::new("ghost", "1.0"))));
        assert!(client(Config::default()).needs_engine(&archive));
    }

    #[test]
    fn build_request_derives_output_artifact_name() {
        let prepared = PreparedArchive {
            host_path: PathBuf::from("/work/target/library_ubuntu_18.04.tar"),
            image: Some(ImageRef::new("library/ubuntu", "18.04")),
        };
        let request = build_request(
            &prepared,
            "/opt/dockinspect/target/library_ubuntu_18.04.tar".to_owned(),
            "/opt/dockinspect/output/",
            true,
        );
        assert_eq!(
            request.container_path_to_output_artifact,
            "/opt/dockinspect/output/library_ubuntu_18.04_containerfilesystem.tar.gz"
        );
        assert_eq!(request.image_repo, "library/ubuntu");
    }
}
