//! 실행 중 생성된 리소스 기록 및 일괄 해제
//!
//! [`ResourceLedger`]는 한 번의 검사 실행이 만든 컨테이너, 이미지, 임시 파일을
//! 기록합니다. 오케스트레이터는 클라이언트가 성공하든 실패하든
//! [`ResourceLedger::release`]를 호출하며, 해제 중 발생한 에러는 로그로만 남기고
//! 원래 에러를 덮어쓰지 않습니다.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use dockinspect_core::types::{ResourceHandle, ResourceKind};

use crate::docker::DockerClient;
use crate::error::InspectorError;

/// 해제 대상 리소스 목록
#[derive(Debug, Default)]
pub struct ResourceLedger {
    containers: Vec<ResourceHandle>,
    images: Vec<ResourceHandle>,
    temp_files: Vec<PathBuf>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 해제 대상 리소스를 기록합니다.
    pub fn track(&mut self, handle: ResourceHandle) {
        debug!(resource = %handle, "tracking resource for cleanup");
        match handle.kind {
            ResourceKind::Container => self.containers.push(handle),
            ResourceKind::Image => {
                if !self.images.iter().any(|h| h.id == handle.id) {
                    self.images.push(handle);
                }
            }
        }
    }

    /// 실행 종료 시 삭제할 임시 파일을 기록합니다.
    pub fn track_temp_file(&mut self, path: impl Into<PathBuf>) {
        self.temp_files.push(path.into());
    }

    pub fn containers(&self) -> &[ResourceHandle] {
        &self.containers
    }

    pub fn images(&self) -> &[ResourceHandle] {
        &self.images
    }

    pub fn temp_files(&self) -> &[PathBuf] {
        &self.temp_files
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.images.is_empty() && self.temp_files.is_empty()
    }

    /// 모든 리소스를 해제합니다.
    ///
    /// 컨테이너(정지 후 삭제), 이미지, 임시 파일 순서로 처리합니다.
    /// 하나가 실패해도 나머지는 계속 해제하며, 실패 목록을 반환합니다.
    /// 정지 실패도 목록에 들어가며, 그 뒤의 강제 삭제는 그대로 시도합니다.
    pub async fn release<D: DockerClient>(
        &mut self,
        docker: &D,
        stop_timeout_secs: i64,
    ) -> Vec<InspectorError> {
        let mut failures = Vec::new();

        for handle in self.containers.drain(..).rev() {
            info!(resource = %handle, "stopping and removing container");
            if let Err(e) = docker.stop_container(&handle.id, stop_timeout_secs).await {
                warn!(resource = %handle, error = %e, "failed to stop container");
                failures.push(e);
            }
            if let Err(e) = docker.remove_container(&handle.id).await {
                warn!(resource = %handle, error = %e, "failed to remove container");
                failures.push(e);
            }
        }

        for handle in self.images.drain(..) {
            info!(resource = %handle, "removing image");
            if let Err(e) = docker.remove_image(&handle.id).await {
                warn!(resource = %handle, error = %e, "failed to remove image");
                failures.push(e);
            }
        }

        for path in self.temp_files.drain(..) {
            if let Err(e) = remove_file_if_exists(&path).await {
                warn!(path = %path.display(), error = %e, "failed to remove temporary file");
                failures.push(e);
            }
        }

        failures
    }
}

async fn remove_file_if_exists(path: &Path) -> Result<(), InspectorError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "removed temporary file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(InspectorError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::MockDockerClient;

    #[tokio::test]
    async fn release_stops_and_removes_containers_then_images() {
        let docker = MockDockerClient::new();
        let mut ledger = ResourceLedger::new();
        ledger.track(ResourceHandle::container("c1", "dockinspect-extractor-alpine"));
        ledger.track(ResourceHandle::image("sha256:aa"));

        let failures = ledger.release(&docker, 10).await;

        assert!(failures.is_empty());
        assert!(ledger.is_empty());
        assert_eq!(
            docker.calls().await,
            vec!["stop c1", "remove c1", "remove_image sha256:aa"]
        );
    }

    #[tokio::test]
    async fn failed_stop_is_counted_and_remove_still_attempted() {
        let docker = MockDockerClient {
            fail_stop_container: true,
            ..MockDockerClient::new()
        };
        let mut ledger = ResourceLedger::new();
        ledger.track(ResourceHandle::container("c1", "x"));

        let failures = ledger.release(&docker, 10).await;

        assert_eq!(failures.len(), 1);
        assert!(failures[0].to_string().contains("stop container"));
        assert_eq!(docker.calls().await, vec!["stop c1", "remove c1"]);
    }

    #[tokio::test]
    async fn release_continues_after_failure() {
        let docker = MockDockerClient {
            fail_remove_container: true,
            ..MockDockerClient::new()
        };
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("alpine_3.6.tar");
        std::fs::write(&temp, b"x").unwrap();

        let mut ledger = ResourceLedger::new();
        ledger.track(ResourceHandle::container("c1", "x"));
        ledger.track_temp_file(&temp);

        let failures = ledger.release(&docker, 10).await;

        assert_eq!(failures.len(), 1);
        assert!(!temp.exists(), "temp file should still be removed");
    }

    #[tokio::test]
    async fn missing_temp_file_is_not_a_failure() {
        let docker = MockDockerClient::new();
        let mut ledger = ResourceLedger::new();
        ledger.track_temp_file("/nonexistent/dockinspect/file.tar");
        assert!(ledger.release(&docker, 1).await.is_empty());
    }

    #[test]
    fn duplicate_images_are_tracked_once() {
        let mut ledger = ResourceLedger::new();
        ledger.track(ResourceHandle::image("sha256:aa"));
        ledger.track(ResourceHandle::image("sha256:aa"));
        assert_eq!(ledger.images().len(), 1);
    }
}
