//! 검사 오케스트레이터 -- 전략 선택부터 정리까지 한 번의 실행 전체를 관리
//!
//! ```text
//! Config ──> strategy::select ──> InspectionClient
//!                                      |
//!                        prepare_request / get_bdio
//!                                      |
//!                               ResultSink.accept()
//!                                      |
//!                        ResourceLedger.release()  (성공/실패 무관)
//! ```
//!
//! 정리는 결과와 무관하게 항상 실행되며, 정리 실패는 로그만 남기고
//! 원래 결과를 덮어쓰지 않습니다.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use dockinspect_core::config::Config;
use dockinspect_core::paths::ProgramPaths;
use dockinspect_core::types::{InspectionResult, Target};

use crate::client::{InspectionClient, LocalInspector};
use crate::docker::DockerClient;
use crate::error::InspectorError;
use crate::ledger::ResourceLedger;
use crate::strategy::{self, Strategy};

/// 검사 결과를 받아 기록하는 협력자
///
/// 출력 파일 작성과 업로드는 이 크레이트 밖에서 구현합니다.
pub trait ResultSink: Send + Sync {
    /// 검사 결과를 처리합니다.
    ///
    /// `container_filesystem`은 컨테이너 파일시스템 아카이브를 출력에
    /// 포함하도록 설정된 경우 그 예상 경로입니다. 파일이 없을 수도 있습니다.
    fn accept(
        &self,
        result: &InspectionResult,
        container_filesystem: Option<&Path>,
    ) -> impl Future<Output = Result<(), InspectorError>> + Send;
}

/// 결과를 버리는 싱크
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl ResultSink for DiscardSink {
    async fn accept(
        &self,
        result: &InspectionResult,
        _container_filesystem: Option<&Path>,
    ) -> Result<(), InspectorError> {
        debug!(bytes = result.document.len(), "discarding inspection result");
        Ok(())
    }
}

/// 한 번의 실행 결과 요약
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub strategy: Strategy,
    pub result: InspectionResult,
    /// 정리 중 실패한 작업 수
    pub cleanup_failures: usize,
}

/// 검사 오케스트레이터
pub struct Orchestrator<D: DockerClient> {
    docker: Arc<D>,
    config: Arc<Config>,
}

impl<D: DockerClient> Orchestrator<D> {
    pub fn new(docker: Arc<D>, config: Arc<Config>) -> Self {
        Self { docker, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 검사를 한 번 실행합니다.
    ///
    /// 이번 실행이 만든 컨테이너, 이미지, 임시 파일은 결과와 무관하게
    /// 반환 전에 정리됩니다.
    pub async fn run<S: ResultSink>(&self, sink: &S) -> Result<RunReport, InspectorError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("inspection_run", run_id = %run_id);
        self.run_inner(run_id, sink).instrument(span).await
    }

    async fn run_inner<S: ResultSink>(
        &self,
        run_id: Uuid,
        sink: &S,
    ) -> Result<RunReport, InspectorError> {
        self.config.validate()?;
        if !self.config.on_host {
            return self.run_in_container(run_id, sink).await;
        }

        let strategy = strategy::select(&self.config)?;
        let target = Target::from_config(&self.config)?;
        info!(strategy = %strategy, target = %target, "starting inspection");

        let client = InspectionClient::for_strategy(
            strategy,
            Arc::clone(&self.docker),
            Arc::clone(&self.config),
        )?;

        if client.needs_engine(&target) {
            self.docker.ping().await.map_err(|e| match e {
                InspectorError::EngineUnavailable(_) => e,
                other => InspectorError::EngineUnavailable(other.to_string()),
            })?;
        } else {
            debug!("container engine not needed for this run");
        }

        let mut ledger = ResourceLedger::new();
        let outcome = self.inspect(&client, &target, sink, &mut ledger).await;

        let failures = ledger
            .release(self.docker.as_ref(), self.config.stop_timeout_secs())
            .await;
        for failure in &failures {
            warn!(error = %failure, "cleanup failed");
        }
        if self.config.cleanup_working_dir {
            self.cleanup_working_dirs().await;
        }

        match outcome {
            Ok(result) => {
                info!(
                    strategy = %strategy,
                    documents = result.source_filename_hints.len(),
                    "inspection completed"
                );
                Ok(RunReport {
                    run_id,
                    strategy,
                    result,
                    cleanup_failures: failures.len(),
                })
            }
            Err(e) => {
                error!(strategy = %strategy, error = %e, "inspection failed");
                Err(e)
            }
        }
    }

    /// 직접 실행 컨테이너 안의 중첩 실행
    ///
    /// 엔진이나 자원 기록 없이 로컬 검사기로 `docker.tar`를 검사합니다.
    /// 결과 문서는 출력 디렉토리에 이미 있으므로 싱크에는 파일시스템
    /// 아카이브 경로를 넘기지 않습니다.
    async fn run_in_container<S: ResultSink>(
        &self,
        run_id: Uuid,
        sink: &S,
    ) -> Result<RunReport, InspectorError> {
        let target = Target::from_config(&self.config)?;
        info!(target = %target, "starting in-container inspection");

        let local = LocalInspector::new(Arc::clone(&self.config));
        let outcome = match local.inspect(&target).await {
            Ok(result) => sink.accept(&result, None).await.map(|()| result),
            Err(e) => Err(e),
        };
        if self.config.cleanup_working_dir {
            self.cleanup_working_dirs().await;
        }

        match outcome {
            Ok(result) => Ok(RunReport {
                run_id,
                strategy: Strategy::DirectExec,
                result,
                cleanup_failures: 0,
            }),
            Err(e) => {
                error!(error = %e, "in-container inspection failed");
                Err(e)
            }
        }
    }

    async fn inspect<S: ResultSink>(
        &self,
        client: &InspectionClient<D>,
        target: &Target,
        sink: &S,
        ledger: &mut ResourceLedger,
    ) -> Result<InspectionResult, InspectorError> {
        let request = client.prepare_request(target, ledger).await?;
        debug!(
            archive = %request.host_path_to_archive.display(),
            container_archive = request.container_path_to_archive.as_str(),
            "inspection request prepared"
        );

        let result = client.get_bdio(&request, ledger).await?;

        let container_filesystem: Option<PathBuf> = self
            .config
            .output_include_containerfilesystem
            .then(|| client.container_filesystem_path(&request));
        sink.accept(&result, container_filesystem.as_deref()).await?;
        Ok(result)
    }

    /// 작업 디렉토리의 실행별 하위 디렉토리를 지웁니다. 실패는 무시합니다.
    async fn cleanup_working_dirs(&self) {
        let paths = ProgramPaths::new(&self.config);
        for dir in [
            paths.host_target_dir(),
            paths.host_output_dir(),
            paths.host_config_dir(),
        ] {
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => debug!(path = %dir.display(), "removed working directory"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %dir.display(), error = %e, "failed to remove working directory"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::Mutex;

    use super::*;
    use crate::docker::MockDockerClient;

    #[derive(Default)]
    struct RecordingSink {
        accepted: Mutex<Vec<(InspectionResult, Option<PathBuf>)>>,
    }

    impl ResultSink for RecordingSink {
        async fn accept(
            &self,
            result: &InspectionResult,
            container_filesystem: Option<&Path>,
        ) -> Result<(), InspectorError> {
            self.accepted
                .lock()
                .await
                .push((result.clone(), container_filesystem.map(Path::to_path_buf)));
            Ok(())
        }
    }

    fn base_config(dir: &Path) -> Config {
        Config {
            working_dir_path: dir.join("work").display().to_string(),
            shared_dir_path_local: dir.join("shared").display().to_string(),
            ..Config::default()
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn off_host_run_inspects_archive_without_engine() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("imageinspector.sh");
        std::fs::write(
            &script,
            "for arg in \"$@\"; do\n\
             case \"$arg\" in --output.path=*) out=\"${arg#--output.path=}\" ;; esac\n\
             done\n\
             printf '[1]' > \"$out/alpine_3.6_bdio.jsonld\"\n",
        )
        .unwrap();
        let config = Config {
            on_host: false,
            upload_bdio: false,
            cleanup_working_dir: false,
            docker_tar: dir.path().join("alpine_3.6.tar").display().to_string(),
            imageinspector_local_command: "/bin/sh".to_owned(),
            inspector_exec_options: script.display().to_string(),
            ..base_config(dir.path())
        };
        let docker = Arc::new(MockDockerClient::new());
        let orchestrator = Orchestrator::new(docker.clone(), Arc::new(config));
        let sink = RecordingSink::default();

        let report = orchestrator.run(&sink).await.unwrap();

        assert_eq!(report.strategy, Strategy::DirectExec);
        assert_eq!(report.result.document, "[1]");
        assert_eq!(
            sink.accepted.lock().await.as_slice(),
            &[(report.result.clone(), None)]
        );
        assert!(docker.calls().await.is_empty());
        assert!(dir.path().join("work/output/alpine_3.6_bdio.jsonld").exists());
    }

    #[tokio::test]
    async fn off_host_run_rejects_image_target() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            on_host: false,
            docker_image: "alpine:3.6".to_owned(),
            ..base_config(dir.path())
        };
        let docker = Arc::new(MockDockerClient::new());
        let orchestrator = Orchestrator::new(docker.clone(), Arc::new(config));

        let err = orchestrator.run(&DiscardSink).await.unwrap_err();

        assert!(matches!(err, InspectorError::Configuration(_)));
        assert!(docker.calls().await.is_empty());
    }

    #[tokio::test]
    async fn missing_target_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let docker = Arc::new(MockDockerClient::new());
        let orchestrator = Orchestrator::new(docker.clone(), Arc::new(base_config(dir.path())));

        let err = orchestrator.run(&DiscardSink).await.unwrap_err();

        assert!(matches!(err, InspectorError::Configuration(_)));
        assert!(docker.calls().await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_engine_stops_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            docker_image: "alpine:3.6".to_owned(),
            ..base_config(dir.path())
        };
        let docker = Arc::new(MockDockerClient {
            fail_ping: true,
            ..MockDockerClient::new()
        });
        let orchestrator = Orchestrator::new(docker.clone(), Arc::new(config));

        let err = orchestrator.run(&RecordingSink::default()).await.unwrap_err();

        assert!(matches!(err, InspectorError::EngineUnavailable(_)));
        assert_eq!(docker.calls().await, vec!["ping"]);
    }

    #[tokio::test]
    async fn direct_exec_failure_still_releases_container() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            docker_image: "alpine:3.6".to_owned(),
            ..base_config(dir.path())
        };
        let docker = Arc::new(MockDockerClient::new().with_exec_exit_code(1));
        let orchestrator = Orchestrator::new(docker.clone(), Arc::new(config));
        let sink = RecordingSink::default();

        let err = orchestrator.run(&sink).await.unwrap_err();

        assert!(matches!(err, InspectorError::ExecFailed { .. }));
        assert!(sink.accepted.lock().await.is_empty());
        assert!(docker.containers.lock().await.is_empty());
        let calls = docker.calls().await;
        let last_two = &calls[calls.len() - 2..];
        assert!(last_two[0].starts_with("stop "));
        assert!(last_two[1].starts_with("remove "));
    }
}
