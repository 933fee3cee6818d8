//! 도메인 타입 — 검사 대상, 리소스 핸들, 요청/결과
//!
//! 모든 크레이트가 공유하는 데이터 구조를 정의합니다.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ConfigError;

/// 태그가 없는 이미지 이름에 적용되는 기본 태그
pub const DEFAULT_TAG: &str = "latest";

/// 이미지 검사 서비스가 지원하는 리눅스 배포판
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectorOs {
    Alpine,
    Centos,
    Ubuntu,
}

impl InspectorOs {
    /// 모든 배포판 (고정 순서)
    pub const ALL: [InspectorOs; 3] = [Self::Alpine, Self::Centos, Self::Ubuntu];

    /// 라벨과 이미지 이름에 쓰이는 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpine => "alpine",
            Self::Centos => "centos",
            Self::Ubuntu => "ubuntu",
        }
    }
}

impl fmt::Display for InspectorOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InspectorOs {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alpine" => Ok(Self::Alpine),
            "centos" => Ok(Self::Centos),
            "ubuntu" => Ok(Self::Ubuntu),
            other => Err(ConfigError::invalid(
                "imageinspector.service.distro.default",
                format!("unsupported distro '{other}' (expected alpine, centos, or ubuntu)"),
            )),
        }
    }
}

/// `repo:tag` 형식의 이미지 참조
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub repo: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(repo: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            tag: tag.into(),
        }
    }

    /// `repo[:tag]` 문자열을 파싱합니다.
    ///
    /// 마지막 `:` 뒤에 `/`가 있으면 레지스트리 포트로 간주하여 태그가 없는 것으로
    /// 처리합니다 (`localhost:5000/app` → `localhost:5000/app:latest`).
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidTarget {
                reason: "image name is empty".to_owned(),
            });
        }

        let (repo, tag) = match name.rfind(':') {
            Some(idx) if !name[idx + 1..].contains('/') => (&name[..idx], &name[idx + 1..]),
            _ => (name, DEFAULT_TAG),
        };

        if repo.is_empty() || tag.is_empty() {
            return Err(ConfigError::InvalidTarget {
                reason: format!("malformed image name '{name}'"),
            });
        }

        Ok(Self::new(repo, tag))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repo, self.tag)
    }
}

/// 검사 대상
///
/// 실행마다 정확히 하나의 형태만 유효합니다. 생성 후에는 변경되지 않으며,
/// 이미지 ID 해석은 새 `Target`을 반환합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 풀(pull) 후 저장할 이미지
    Image(ImageRef),
    /// 이미 내보낸 이미지 아카이브
    Archive {
        path: PathBuf,
        repo: Option<String>,
        tag: Option<String>,
    },
    /// 엔진에 질의하여 `repo:tag`로 해석할 이미지 ID
    ImageId(String),
}

impl Target {
    /// 설정에서 검사 대상을 결정합니다.
    ///
    /// `docker.tar`, `docker.image.id`, `docker.image` 중 정확히 하나만
    /// 설정되어 있어야 합니다.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let given: Vec<&str> = [
            ("docker.tar", &config.docker_tar),
            ("docker.image.id", &config.docker_image_id),
            ("docker.image", &config.docker_image),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();

        match given.as_slice() {
            [] => Err(ConfigError::InvalidTarget {
                reason: "one of docker.image, docker.tar, or docker.image.id is required".to_owned(),
            }),
            ["docker.tar"] => Ok(Self::Archive {
                path: PathBuf::from(config.docker_tar.trim()),
                repo: non_blank(&config.docker_image_repo),
                tag: non_blank(&config.docker_image_tag),
            }),
            ["docker.image.id"] => Ok(Self::ImageId(config.docker_image_id.trim().to_owned())),
            ["docker.image"] => Ok(Self::Image(ImageRef::parse(&config.docker_image)?)),
            several => Err(ConfigError::InvalidTarget {
                reason: format!("only one target may be given, found: {}", several.join(", ")),
            }),
        }
    }

    /// 알려진 경우 `repo:tag` 참조를 반환합니다.
    pub fn image_ref(&self) -> Option<ImageRef> {
        match self {
            Self::Image(image) => Some(image.clone()),
            Self::Archive {
                repo: Some(repo),
                tag,
                ..
            } => Some(ImageRef::new(
                repo.clone(),
                tag.clone().unwrap_or_else(|| DEFAULT_TAG.to_owned()),
            )),
            Self::Archive { .. } | Self::ImageId(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(image) => write!(f, "image {image}"),
            Self::Archive { path, .. } => write!(f, "archive {}", path.display()),
            Self::ImageId(id) => write!(f, "image id {id}"),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// 리소스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Container,
}

/// 컨테이너 엔진 리소스 식별자
///
/// 핸들을 만든 컴포넌트가 명시적으로 해제(정지+삭제)하거나 호출자에게
/// 넘겨주기 전까지 소유권을 가집니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl ResourceHandle {
    pub fn image(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Image,
            id: id.into(),
            name: None,
            labels: HashMap::new(),
        }
    }

    pub fn container(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Container,
            id: id.into(),
            name: Some(name.into()),
            labels: HashMap::new(),
        }
    }

    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ResourceKind::Image => "image",
            ResourceKind::Container => "container",
        };
        match &self.name {
            Some(name) => write!(f, "{kind} {name} ({})", self.id),
            None => write!(f, "{kind} {}", self.id),
        }
    }
}

/// `listContainers` 결과 한 건
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub id: String,
    /// 엔진이 돌려주는 이름 (앞의 `/` 포함 가능)
    pub names: Vec<String>,
    pub labels: HashMap<String, String>,
    /// 사람이 읽는 상태 (예: `Up 3 minutes`, `Exited (0) 1 hour ago`)
    pub status: String,
    /// 기계 판독용 상태 (예: `running`, `exited`)
    pub state: String,
}

impl ContainerSummary {
    /// 컨테이너가 실행 중인지 확인합니다.
    pub fn is_running(&self) -> bool {
        self.state.eq_ignore_ascii_case("running") || self.status.starts_with("Up")
    }

    /// 이름 중 하나가 주어진 문자열을 포함하는지 확인합니다.
    pub fn name_contains(&self, fragment: &str) -> bool {
        self.names.iter().any(|n| n.contains(fragment))
    }
}

/// `listImages` 결과 한 건
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub id: String,
    pub repo_tags: Vec<String>,
}

/// 검사 클라이언트에 전달되는 요청
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionRequest {
    /// 오케스트레이터 파일시스템 기준 아카이브 경로
    pub host_path_to_archive: PathBuf,
    /// 검사 백엔드 기준 아카이브 경로
    pub container_path_to_archive: String,
    pub image_repo: String,
    pub image_tag: String,
    /// 검사 백엔드 기준 컨테이너 파일시스템 출력 경로
    pub container_path_to_output_artifact: String,
    pub cleanup_requested: bool,
}

/// 검사 결과
///
/// `document`는 이 크레이트에서 해석하지 않는 불투명한 문서입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionResult {
    pub document: String,
    pub source_filename_hints: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_image_with_tag() {
        let image = ImageRef::parse("alpine:3.6").unwrap();
        assert_eq!(image.repo, "alpine");
        assert_eq!(image.tag, "3.6");
    }

    #[test]
    fn parse_image_without_tag_defaults_to_latest() {
        let image = ImageRef::parse("library/ubuntu").unwrap();
        assert_eq!(image, ImageRef::new("library/ubuntu", "latest"));
    }

    #[test]
    fn parse_image_with_registry_port() {
        let image = ImageRef::parse("localhost:5000/team/app").unwrap();
        assert_eq!(image.repo, "localhost:5000/team/app");
        assert_eq!(image.tag, "latest");

        let image = ImageRef::parse("localhost:5000/team/app:2.1").unwrap();
        assert_eq!(image.repo, "localhost:5000/team/app");
        assert_eq!(image.tag, "2.1");
    }

    #[test]
    fn parse_image_rejects_empty_and_dangling_colon() {
        assert!(ImageRef::parse("  ").is_err());
        assert!(ImageRef::parse("alpine:").is_err());
        assert!(ImageRef::parse(":3.6").is_err());
    }

    #[test]
    fn inspector_os_parse_is_case_insensitive() {
        assert_eq!("UBUNTU".parse::<InspectorOs>().unwrap(), InspectorOs::Ubuntu);
        assert_eq!(" Alpine ".parse::<InspectorOs>().unwrap(), InspectorOs::Alpine);
        assert!("debian".parse::<InspectorOs>().is_err());
    }

    #[test]
    fn target_from_image() {
        let config = Config {
            docker_image: "alpine:3.6".to_owned(),
            ..Config::default()
        };
        let target = Target::from_config(&config).unwrap();
        assert_eq!(target, Target::Image(ImageRef::new("alpine", "3.6")));
    }

    #[test]
    fn target_from_archive_keeps_repo_and_tag() {
        let config = Config {
            docker_tar: "/tmp/ghost.tar".to_owned(),
            docker_image_repo: "ghost".to_owned(),
            docker_image_tag: "1.0".to_owned(),
            ..Config::default()
        };
        let target = Target::from_config(&config).unwrap();
        assert_eq!(target.image_ref(), Some(ImageRef::new("ghost", "1.0")));
    }

    #[test]
    fn target_requires_exactly_one_source() {
        let none = Config::default();
        assert!(matches!(
            Target::from_config(&none),
            Err(ConfigError::InvalidTarget { .. })
        ));

        let both = Config {
            docker_image: "alpine:3.6".to_owned(),
            docker_image_id: "sha256:abc".to_owned(),
            ..Config::default()
        };
        let err = Target::from_config(&both).unwrap_err();
        assert!(err.to_string().contains("docker.image.id"));
    }

    #[test]
    fn container_summary_running_detection() {
        let up = ContainerSummary {
            status: "Up 2 minutes".to_owned(),
            ..ContainerSummary::default()
        };
        let exited = ContainerSummary {
            status: "Exited (0) 5 seconds ago".to_owned(),
            state: "exited".to_owned(),
            ..ContainerSummary::default()
        };
        assert!(up.is_running());
        assert!(!exited.is_running());
    }

    #[test]
    fn resource_handle_display() {
        let handle = ResourceHandle::container("abc123", "dockinspect-extractor-alpine");
        assert_eq!(
            handle.to_string(),
            "container dockinspect-extractor-alpine (abc123)"
        );
        assert_eq!(ResourceHandle::image("sha256:1").to_string(), "image sha256:1");
    }
}
