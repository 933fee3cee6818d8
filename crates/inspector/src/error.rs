//! 검사 오케스트레이터 에러 타입
//!
//! [`InspectorError`]는 컨테이너 엔진 호출, 원격 검사 서비스 호출,
//! 결과 수집 과정에서 발생하는 모든 에러를 표현합니다.
//! 모든 변형은 실패한 작업과 대상(이미지, 컨테이너, 경로)을 함께 담아
//! 최종 메시지만으로 무엇이 실패했는지 알 수 있게 합니다.

use dockinspect_core::error::ConfigError;

/// 검사 오케스트레이터 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum InspectorError {
    /// 컨테이너 엔진에 연결할 수 없음 (재시도 없이 즉시 중단)
    #[error("container engine unavailable: {0}")]
    EngineUnavailable(String),

    /// 이미지 풀 실패 (로컬 캐시를 가정하고 계속 진행)
    #[error("failed to pull image {image}: {reason}")]
    PullFailed { image: String, reason: String },

    /// 이미지 저장 실패
    #[error("failed to save image {image}: {reason}")]
    SaveFailed { image: String, reason: String },

    /// 이미지 삭제 실패 (best-effort)
    #[error("failed to remove image {image}: {reason}")]
    ImageRemovalFailed { image: String, reason: String },

    /// 컨테이너 로그 조회 실패 (best-effort)
    #[error("failed to fetch logs of container {container}: {reason}")]
    ContainerLogFetchFailed { container: String, reason: String },

    /// 이전 컨테이너를 정지/삭제할 수 없음
    #[error("failed to reconcile existing container {container}: {reason}")]
    ContainerReconciliationFailed { container: String, reason: String },

    /// 설정 에러
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// 원격 검사 서비스 호출 실패 (non-2xx 또는 잘못된 응답)
    #[error("remote inspection via {url} failed: {reason}")]
    RemoteInspectionFailed { url: String, reason: String },

    /// 컨테이너 내부 검사기 실행 실패 (비정상 종료 또는 타임아웃)
    #[error("inspector execution in container {container} failed: {reason}")]
    ExecFailed { container: String, reason: String },

    /// 그 외 컨테이너 엔진 API 실패
    #[error("docker api error during {operation} of {target}: {reason}")]
    DockerApi {
        operation: String,
        target: String,
        reason: String,
    },

    /// 검사 문서가 생성되지 않음
    #[error("no inspection document found in {path}")]
    MissingOutput { path: String },

    /// 파일시스템 에러
    #[error("i/o error on {path}: {reason}")]
    Io { path: String, reason: String },

    /// Hub 업로드 실패
    #[error("upload to {url} failed: {reason}")]
    Upload { url: String, reason: String },
}

impl InspectorError {
    /// `DockerApi` 에러를 생성합니다.
    pub fn docker_api(
        operation: impl Into<String>,
        target: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::DockerApi {
            operation: operation.into(),
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// 경로 정보를 포함한 `Io` 에러를 생성합니다.
    pub fn io(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }

    /// 실행을 중단해야 하는 에러인지 확인합니다.
    ///
    /// 풀 실패, 이미지 삭제 실패, 로그 조회 실패는 로그만 남기고
    /// 계속 진행하는 best-effort 에러입니다.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::PullFailed { .. }
                | Self::ImageRemovalFailed { .. }
                | Self::ContainerLogFetchFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_effort_kinds_are_not_fatal() {
        let pull = InspectorError::PullFailed {
            image: "ghost:1.0".to_owned(),
            reason: "not found".to_owned(),
        };
        let removal = InspectorError::ImageRemovalFailed {
            image: "sha256:abc".to_owned(),
            reason: "conflict".to_owned(),
        };
        let logs = InspectorError::ContainerLogFetchFailed {
            container: "abc".to_owned(),
            reason: "gone".to_owned(),
        };
        assert!(!pull.is_fatal());
        assert!(!removal.is_fatal());
        assert!(!logs.is_fatal());
    }

    #[test]
    fn fatal_kinds() {
        assert!(InspectorError::EngineUnavailable("refused".to_owned()).is_fatal());
        assert!(
            InspectorError::SaveFailed {
                image: "alpine:3.6".to_owned(),
                reason: "no such image".to_owned(),
            }
            .is_fatal()
        );
        assert!(InspectorError::Configuration(ConfigError::NoStrategy).is_fatal());
    }

    #[test]
    fn save_failed_names_target() {
        let err = InspectorError::SaveFailed {
            image: "alpine:3.6".to_owned(),
            reason: "no such image".to_owned(),
        };
        assert!(err.to_string().contains("alpine:3.6"));
    }

    #[test]
    fn docker_api_carries_operation_and_target() {
        let err = InspectorError::docker_api("create container", "dockinspect-extractor-alpine", "409");
        let msg = err.to_string();
        assert!(msg.contains("create container"));
        assert!(msg.contains("dockinspect-extractor-alpine"));
    }

    #[test]
    fn config_error_converts() {
        let err: InspectorError = ConfigError::NoStrategy.into();
        assert!(matches!(err, InspectorError::Configuration(_)));
    }
}
