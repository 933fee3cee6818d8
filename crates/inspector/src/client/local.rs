//! 컨테이너 내부 검사
//!
//! `on.host = false`인 실행은 이미 검사기 이미지 안에서 돌고 있으므로
//! 엔진을 거치지 않고 로컬 이미지 검사기 실행 파일로 `docker.tar`를 직접
//! 검사합니다. 검사기는 작업 디렉토리의 출력 디렉토리에 `*_bdio.jsonld`
//! 파일을 남기고, 호스트 쪽 실행은 마운트된 같은 디렉토리에서 그 파일을 읽습니다.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::{debug, info, warn};

use dockinspect_core::config::Config;
use dockinspect_core::error::ConfigError;
use dockinspect_core::paths::ProgramPaths;
use dockinspect_core::types::{InspectionResult, Target};

use super::exec::read_output_documents;
use crate::error::InspectorError;

/// 로컬 이미지 검사기 실행기
pub struct LocalInspector {
    config: Arc<Config>,
    paths: ProgramPaths,
}

impl LocalInspector {
    pub fn new(config: Arc<Config>) -> Self {
        let paths = ProgramPaths::new(&config);
        Self { config, paths }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.paths.host_output_dir()
    }

    /// 검사기 명령줄
    ///
    /// `imageinspector.local.command` 뒤에 `inspector.exec.options`,
    /// 아카이브 경로, 출력 디렉토리, 알려진 경우 repo/tag 순으로 붙습니다.
    pub fn command(&self, archive: &Path, repo: Option<&str>, tag: Option<&str>) -> Vec<String> {
        let mut cmd = vec![self.config.imageinspector_local_command.trim().to_owned()];
        cmd.extend(
            self.config
                .inspector_exec_options
                .split_whitespace()
                .map(str::to_owned),
        );
        cmd.push(format!("--docker.tar={}", archive.display()));
        cmd.push(format!("--output.path={}", self.output_dir().display()));
        if let Some(repo) = repo.filter(|r| !r.is_empty()) {
            cmd.push(format!("--docker.image.repo={repo}"));
        }
        if let Some(tag) = tag.filter(|t| !t.is_empty()) {
            cmd.push(format!("--docker.image.tag={tag}"));
        }
        cmd.push(format!(
            "--output.include.containerfilesystem={}",
            self.config.output_include_containerfilesystem
        ));
        cmd
    }

    /// 아카이브를 검사하고 출력 디렉토리의 결과 문서를 읽습니다.
    ///
    /// # Errors
    ///
    /// - 대상이 아카이브가 아니면 `Configuration`
    /// - 검사기가 비정상 종료하거나 `command.timeout`을 넘기면 `ExecFailed`
    /// - 결과 문서가 없으면 `MissingOutput`
    pub async fn inspect(&self, target: &Target) -> Result<InspectionResult, InspectorError> {
        let Target::Archive { path, repo, tag } = target else {
            return Err(ConfigError::invalid(
                "docker.tar",
                "an in-container run inspects an image archive only",
            )
            .into());
        };

        let output_dir = self.output_dir();
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| InspectorError::io(&output_dir, e))?;

        let cmd = self.command(path, repo.as_deref(), tag.as_deref());
        self.run(&cmd).await?;

        let result = read_output_documents(&output_dir).await?;
        info!(
            archive = %path.display(),
            documents = result.source_filename_hints.len(),
            "local image inspector produced inspection output"
        );
        Ok(result)
    }

    async fn run(&self, cmd: &[String]) -> Result<(), InspectorError> {
        let Some((program, args)) = cmd.split_first().filter(|(p, _)| !p.is_empty()) else {
            return Err(
                ConfigError::invalid("imageinspector.local.command", "must not be empty").into(),
            );
        };
        let exec_failed = |reason: String| InspectorError::ExecFailed {
            container: program.clone(),
            reason,
        };

        info!(program = program.as_str(), "running local image inspector");
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let timeout = self.config.command_timeout();
        let output = match tokio::time::timeout(timeout, command.output()).await {
            Ok(result) => result.map_err(|e| exec_failed(format!("failed to start: {e}")))?,
            Err(_elapsed) => {
                return Err(exec_failed(format!(
                    "timed out after {} ms",
                    timeout.as_millis()
                )));
            }
        };

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(program = program.as_str(), "{line}");
        }
        if !output.status.success() {
            for line in String::from_utf8_lossy(&output.stderr).lines() {
                warn!(program = program.as_str(), "{line}");
            }
            let reason = match output.status.code() {
                Some(code) => format!("exited with code {code}"),
                None => "terminated by signal".to_owned(),
            };
            return Err(exec_failed(reason));
        }
        Ok(())
    }
}
