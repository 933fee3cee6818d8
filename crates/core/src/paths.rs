//! 결정적 경로 및 이름 규칙
//!
//! 작업 디렉토리 레이아웃, 컨테이너 내부 프로그램 디렉토리, 이미지 이름에서
//! 파생되는 파일 이름과 컨테이너 이름을 한곳에서 정의합니다.
//! 같은 입력에 대해 항상 같은 이름을 만들어야 이전 실행이 남긴
//! 컨테이너를 다음 실행에서 찾아 정리할 수 있습니다.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::types::InspectorOs;

/// 컨테이너 내부 프로그램 디렉토리
pub const CONTAINER_PROGRAM_DIR: &str = "/opt/dockinspect";

/// 서비스 컨테이너의 애플리케이션 라벨 키
pub const APP_LABEL_KEY: &str = "app";

/// 서비스 컨테이너의 배포판 라벨 키
pub const OS_LABEL_KEY: &str = "os";

/// 서비스 컨테이너의 애플리케이션 라벨 값
pub const SERVICE_APP_NAME: &str = "dockinspect-imageinspector-ws";

/// 직접 실행 컨테이너 이름 접두어
pub const EXTRACTOR_CONTAINER_PREFIX: &str = "dockinspect-extractor-";

/// 속성 파일 이름
pub const PROPERTY_FILENAME: &str = "application.toml";

/// 검사 문서 파일 접미어
pub const BDIO_SUFFIX: &str = "_bdio.jsonld";

const TARGET_DIR: &str = "target";
const OUTPUT_DIR: &str = "output";
const CONFIG_DIR: &str = "config";

/// 한 실행의 호스트/컨테이너 경로 모음
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramPaths {
    working_dir: PathBuf,
    shared_local_dir: PathBuf,
    shared_container_dir: String,
}

impl ProgramPaths {
    pub fn new(config: &Config) -> Self {
        Self {
            working_dir: PathBuf::from(config.working_dir_path.trim()),
            shared_local_dir: PathBuf::from(config.shared_dir_path_local.trim()),
            shared_container_dir: config
                .shared_dir_path_imageinspector
                .trim()
                .trim_end_matches('/')
                .to_owned(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// 호스트에서 저장한 이미지 아카이브를 두는 디렉토리
    pub fn host_target_dir(&self) -> PathBuf {
        self.working_dir.join(TARGET_DIR)
    }

    /// 직접 실행 컨테이너에 마운트되는 출력 디렉토리
    pub fn host_output_dir(&self) -> PathBuf {
        self.working_dir.join(OUTPUT_DIR)
    }

    pub fn host_config_dir(&self) -> PathBuf {
        self.working_dir.join(CONFIG_DIR)
    }

    pub fn host_property_file(&self) -> PathBuf {
        self.host_config_dir().join(PROPERTY_FILENAME)
    }

    pub fn container_target_dir(&self) -> String {
        format!("{CONTAINER_PROGRAM_DIR}/{TARGET_DIR}")
    }

    pub fn container_output_dir(&self) -> String {
        format!("{CONTAINER_PROGRAM_DIR}/{OUTPUT_DIR}")
    }

    pub fn container_config_dir(&self) -> String {
        format!("{CONTAINER_PROGRAM_DIR}/{CONFIG_DIR}")
    }

    pub fn container_property_file(&self) -> String {
        format!("{}/{PROPERTY_FILENAME}", self.container_config_dir())
    }

    /// 서비스와 공유하는 호스트 디렉토리
    pub fn shared_local_dir(&self) -> &Path {
        &self.shared_local_dir
    }

    /// 서비스 컨테이너 안에서 본 공유 디렉토리
    pub fn shared_container_dir(&self) -> &str {
        &self.shared_container_dir
    }

    pub fn shared_target_dir(&self) -> PathBuf {
        self.shared_local_dir.join(TARGET_DIR)
    }

    pub fn shared_output_dir(&self) -> PathBuf {
        self.shared_local_dir.join(OUTPUT_DIR)
    }
}

/// `/`를 `_`로 바꾼 저장소 이름
fn slashes_to_underscores(repo: &str) -> String {
    repo.replace('/', "_")
}

/// 저장한 이미지 아카이브 파일 이름 (`alpine_3.6.tar`)
pub fn image_archive_filename(repo: &str, tag: &str) -> String {
    format!("{}_{tag}.tar", slashes_to_underscores(repo))
}

/// 컨테이너 파일시스템 아카이브 파일 이름
pub fn container_filesystem_filename(repo: &str, tag: &str) -> String {
    format!("{}_{tag}_containerfilesystem.tar.gz", slashes_to_underscores(repo))
}

/// HTTP 응답 문서에 붙이는 파일 이름
pub fn bdio_filename(repo: &str, tag: &str) -> String {
    format!("{}_{tag}{BDIO_SUFFIX}", slashes_to_underscores(repo))
}

/// 직접 실행 컨테이너 이름
///
/// 엔진이 허용하지 않는 문자는 `_`로 바꿉니다.
pub fn extractor_container_name(repo: &str) -> String {
    let sanitized: String = repo
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{EXTRACTOR_CONTAINER_PREFIX}{sanitized}")
}

pub fn service_container_name(os: InspectorOs) -> String {
    format!("{SERVICE_APP_NAME}-{os}")
}

/// 서비스 컨테이너에 붙이는 라벨
pub fn service_labels(os: InspectorOs) -> HashMap<String, String> {
    HashMap::from([
        (APP_LABEL_KEY.to_owned(), SERVICE_APP_NAME.to_owned()),
        (OS_LABEL_KEY.to_owned(), os.as_str().to_owned()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_replace_slashes() {
        assert_eq!(image_archive_filename("alpine", "3.6"), "alpine_3.6.tar");
        assert_eq!(
            image_archive_filename("library/ubuntu", "18.04"),
            "library_ubuntu_18.04.tar"
        );
        assert_eq!(
            container_filesystem_filename("blackducksoftware/ghost", "1.0"),
            "blackducksoftware_ghost_1.0_containerfilesystem.tar.gz"
        );
        assert_eq!(bdio_filename("ghost", "1.0"), "ghost_1.0_bdio.jsonld");
    }

    #[test]
    fn extractor_name_is_deterministic_and_sanitized() {
        assert_eq!(extractor_container_name("alpine"), "dockinspect-extractor-alpine");
        assert_eq!(
            extractor_container_name("localhost:5000/team/app"),
            "dockinspect-extractor-localhost_5000_team_app"
        );
        assert_eq!(
            extractor_container_name("alpine"),
            extractor_container_name("alpine")
        );
    }

    #[test]
    fn service_labels_carry_app_and_os() {
        let labels = service_labels(InspectorOs::Centos);
        assert_eq!(labels.get(APP_LABEL_KEY).map(String::as_str), Some(SERVICE_APP_NAME));
        assert_eq!(labels.get(OS_LABEL_KEY).map(String::as_str), Some("centos"));
        assert_eq!(
            service_container_name(InspectorOs::Centos),
            "dockinspect-imageinspector-ws-centos"
        );
    }

    #[test]
    fn program_paths_layout() {
        let config = Config {
            working_dir_path: "/work".to_owned(),
            shared_dir_path_local: "/work/shared".to_owned(),
            shared_dir_path_imageinspector: "/opt/shared/".to_owned(),
            ..Config::default()
        };
        let paths = ProgramPaths::new(&config);
        assert_eq!(paths.host_target_dir(), PathBuf::from("/work/target"));
        assert_eq!(
            paths.host_property_file(),
            PathBuf::from("/work/config/application.toml")
        );
        assert_eq!(
            paths.container_property_file(),
            "/opt/dockinspect/config/application.toml"
        );
        assert_eq!(paths.shared_container_dir(), "/opt/shared");
        assert_eq!(paths.shared_output_dir(), PathBuf::from("/work/shared/output"));
    }
}
