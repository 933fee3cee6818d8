//! 설정 관리 — 정적 옵션 테이블 기반의 평면 키/값 설정
//!
//! [`Config`]는 모든 설정값을 담는 평면 구조체이고, [`OPTIONS`]는 각 키의
//! 타입, 기본값, 공개 여부, 설명, 접근자를 컴파일 타임에 나열한 테이블입니다.
//! 사용법 출력과 설정 표시는 이 테이블에 대한 순수 함수입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 명령줄 `--key=value` (최고 우선)
//! 2. 환경변수 (`DOCKINSPECT_HUB_URL=...` 형식)
//! 3. 설정 파일 (`dockinspect.toml`)
//! 4. 기본값
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), dockinspect_core::error::ConfigError> {
//! use dockinspect_core::config::Config;
//!
//! let overrides = vec![("docker.image".to_owned(), "alpine:3.6".to_owned())];
//! let config = Config::load(Some("dockinspect.toml".as_ref()), &overrides).await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = Config::parse("[hub]\nurl = \"https://hub.example.com\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::types::{ImageRef, InspectorOs};

/// 환경변수 오버라이드 접두어
pub const ENV_PREFIX: &str = "DOCKINSPECT_";

/// 표시할 때 값을 가리는 키
const SECRET_KEYS: [&str; 4] = [
    "hub.password",
    "hub.api.token",
    "hub.proxy.password",
    "hub.username",
];

const VALID_LOG_LEVELS: [&str; 5] = ["ERROR", "WARN", "INFO", "DEBUG", "TRACE"];

/// 옵션 공개 범위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionGroup {
    /// 사용법 출력에 나타나는 옵션
    Public,
    /// 내부용 옵션 (중첩 실행, 이미지 선택 등)
    Private,
}

/// 옵션 값 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueType {
    String,
    Boolean,
    Integer,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
        }
    }
}

/// 옵션 테이블의 한 항목
pub struct ConfigOption {
    pub key: &'static str,
    pub value_type: ValueType,
    pub group: OptionGroup,
    pub default_value: &'static str,
    pub description: &'static str,
    /// 현재 값을 문자열로 읽습니다.
    pub get: fn(&Config) -> String,
    /// 문자열 값을 파싱하여 설정합니다.
    pub set: fn(&mut Config, &str) -> Result<(), ConfigError>,
}

impl ConfigOption {
    /// 이 옵션의 환경변수 이름 (`hub.url` → `DOCKINSPECT_HUB_URL`)
    pub fn env_key(&self) -> String {
        format!("{ENV_PREFIX}{}", self.key.to_ascii_uppercase().replace('.', "_"))
    }

    /// 값을 가려야 하는 옵션인지 확인합니다.
    pub fn is_secret(&self) -> bool {
        SECRET_KEYS.contains(&self.key)
    }
}

impl std::fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigOption")
            .field("key", &self.key)
            .field("value_type", &self.value_type)
            .field("group", &self.group)
            .field("default_value", &self.default_value)
            .finish()
    }
}

/// 문자열에서 설정 필드 타입으로의 변환
trait OptionValue: Sized {
    fn parse_option(key: &str, raw: &str) -> Result<Self, ConfigError>;
}

impl OptionValue for String {
    fn parse_option(_key: &str, raw: &str) -> Result<Self, ConfigError> {
        Ok(raw.trim().to_owned())
    }
}

impl OptionValue for bool {
    fn parse_option(key: &str, raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(ConfigError::invalid(
                key,
                format!("expected true or false, got '{other}'"),
            )),
        }
    }
}

macro_rules! impl_option_value_int {
    ($($ty:ty),*) => {
        $(
            impl OptionValue for $ty {
                fn parse_option(key: &str, raw: &str) -> Result<Self, ConfigError> {
                    raw.trim().parse::<$ty>().map_err(|e| {
                        ConfigError::invalid(key, format!("expected integer, got '{}': {e}", raw.trim()))
                    })
                }
            }
        )*
    };
}

impl_option_value_int!(u16, u32, u64);

macro_rules! option {
    ($key:literal, $field:ident, $kind:ident, $group:ident, $default:literal, $desc:literal) => {
        ConfigOption {
            key: $key,
            value_type: ValueType::$kind,
            group: OptionGroup::$group,
            default_value: $default,
            description: $desc,
            get: |c: &Config| c.$field.to_string(),
            set: |c: &mut Config, raw: &str| -> Result<(), ConfigError> {
                c.$field = OptionValue::parse_option($key, raw)?;
                Ok(())
            },
        }
    };
}

/// 지원하는 모든 옵션
///
/// `Config::default()`의 값과 `default_value`는 항상 일치해야 합니다.
pub static OPTIONS: &[ConfigOption] = &[
    // --- Hub 연결 ---
    option!("hub.url", hub_url, String, Public, "", "Hub URL"),
    option!("hub.timeout", hub_timeout_secs, Integer, Public, "120", "Hub timeout in seconds"),
    option!("hub.api.token", hub_api_token, String, Public, "", "Hub API token"),
    option!("hub.username", hub_username, String, Public, "", "Hub username"),
    option!("hub.password", hub_password, String, Public, "", "Hub password"),
    option!("hub.proxy.host", hub_proxy_host, String, Public, "", "Hub proxy host"),
    option!("hub.proxy.port", hub_proxy_port, String, Public, "", "Hub proxy port"),
    option!("hub.proxy.username", hub_proxy_username, String, Public, "", "Hub proxy username"),
    option!("hub.proxy.password", hub_proxy_password, String, Public, "", "Hub proxy password"),
    option!("hub.always.trust.cert", hub_always_trust_cert, Boolean, Public, "false", "Trust the Hub server certificate without verification?"),
    option!("hub.project.name", hub_project_name, String, Public, "", "Hub project name"),
    option!("hub.project.version", hub_project_version, String, Public, "", "Hub project version"),
    option!("hub.codelocation.prefix", hub_codelocation_prefix, String, Public, "", "Hub code location prefix"),
    // --- 실행 ---
    option!("working.dir.path", working_dir_path, String, Public, "/tmp/dockinspect-files", "Working directory path"),
    option!("cleanup.working.dir", cleanup_working_dir, Boolean, Public, "true", "Remove working files after the run?"),
    option!("command.timeout", command_timeout_ms, Integer, Public, "120000", "Command timeout (milliseconds)"),
    option!("logging.level", logging_level, String, Public, "INFO", "Logging level (WARN, INFO, DEBUG, TRACE)"),
    option!("output.path", output_path, String, Public, "", "Path to directory for output files"),
    option!("output.include.containerfilesystem", output_include_containerfilesystem, Boolean, Public, "false", "Include container filesystem (a large file) in output?"),
    // --- 검사 대상 ---
    option!("docker.image", docker_image, String, Public, "", "Docker image name:tag"),
    option!("docker.tar", docker_tar, String, Public, "", "Docker image tarfile path"),
    option!("docker.image.id", docker_image_id, String, Public, "", "Docker image ID"),
    option!("docker.image.repo", docker_image_repo, String, Public, "", "Docker image repo; use with docker.image.tag to select one image from a tarfile"),
    option!("docker.image.tag", docker_image_tag, String, Public, "", "Docker image tag; use with docker.image.repo to select one image from a tarfile"),
    option!("upload.bdio", upload_bdio, Boolean, Public, "true", "Upload the inspection document to the Hub?"),
    // --- 정리 ---
    option!("cleanup.target.image", cleanup_target_image, Boolean, Public, "false", "Remove target image after saving it?"),
    option!("cleanup.inspector.container", cleanup_inspector_container, Boolean, Public, "true", "Stop and remove the inspector container after using it?"),
    option!("cleanup.inspector.image", cleanup_inspector_image, Boolean, Public, "false", "Remove the inspector image after using it?"),
    // --- 이미지 검사 서비스 ---
    option!("shared.dir.path.local", shared_dir_path_local, String, Public, "/tmp/dockinspect-files/shared", "The host's path to the directory shared with the image inspector service containers"),
    option!("shared.dir.path.imageinspector", shared_dir_path_imageinspector, String, Public, "/opt/dockinspect/imageinspector-ws/shared", "The image inspector container's path to the shared directory"),
    option!("imageinspector.service.start", imageinspector_service_start, Boolean, Public, "false", "Start image inspector services (containers) as needed?"),
    option!("imageinspector.service.port.alpine", service_host_port_alpine, Integer, Public, "9000", "alpine image inspector host port"),
    option!("imageinspector.service.port.centos", service_host_port_centos, Integer, Public, "9001", "centos image inspector host port"),
    option!("imageinspector.service.port.ubuntu", service_host_port_ubuntu, Integer, Public, "9002", "ubuntu image inspector host port"),
    option!("imageinspector.service.distro.default", imageinspector_service_distro_default, String, Public, "ubuntu", "Default image inspector Linux distro (alpine, centos, or ubuntu)"),
    // --- 내부용 ---
    option!("on.host", on_host, Boolean, Private, "true", "Running on host?"),
    option!("caller.name", caller_name, String, Private, "", "Caller name"),
    option!("caller.version", caller_version, String, Private, "", "Caller version"),
    option!("inspector.repository", inspector_repository, String, Private, "dockinspect", "Repository name for the inspector images"),
    option!("inspector.image.family", inspector_image_family, String, Private, "docker-inspector", "Direct exec inspector image family"),
    option!("inspector.image.version", inspector_image_version, String, Private, "1.0.0", "Inspector image version"),
    option!("imageinspector.service.image.family", imageinspector_service_image_family, String, Private, "imageinspector-ws", "Image inspector service image family"),
    option!("imageinspector.service.url", imageinspector_service_url, String, Private, "", "The URL of the (already running) image inspector service to use"),
    option!("imageinspector.service.container.port.alpine", service_container_port_alpine, Integer, Private, "8080", "alpine image inspector container port"),
    option!("imageinspector.service.container.port.centos", service_container_port_centos, Integer, Private, "8081", "centos image inspector container port"),
    option!("imageinspector.service.container.port.ubuntu", service_container_port_ubuntu, Integer, Private, "8082", "ubuntu image inspector container port"),
    option!("imageinspector.service.health.retries", service_health_retries, Integer, Private, "30", "Health checks before giving up on a started service"),
    option!("imageinspector.service.health.interval.ms", service_health_interval_ms, Integer, Private, "2000", "Milliseconds between service health checks"),
    option!("inspector.binary.path", inspector_binary_path, String, Private, "", "Inspector executable to copy into the direct exec container"),
    option!("inspector.exec.options", inspector_exec_options, String, Private, "", "Extra whitespace-separated arguments for the nested or local inspector"),
    option!("inspector.command", inspector_command, String, Private, "/opt/dockinspect/bin/dockinspect-inspect", "Nested inspector command inside the direct exec container"),
    option!("imageinspector.local.command", imageinspector_local_command, String, Private, "/opt/dockinspect/bin/imageinspector", "Image inspector executable run by an in-container (on.host=false) inspection"),
];

/// dockinspect 통합 설정
///
/// 모든 필드는 [`OPTIONS`] 테이블의 한 항목에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub hub_url: String,
    pub hub_timeout_secs: u64,
    pub hub_api_token: String,
    pub hub_username: String,
    pub hub_password: String,
    pub hub_proxy_host: String,
    pub hub_proxy_port: String,
    pub hub_proxy_username: String,
    pub hub_proxy_password: String,
    pub hub_always_trust_cert: bool,
    pub hub_project_name: String,
    pub hub_project_version: String,
    pub hub_codelocation_prefix: String,

    pub working_dir_path: String,
    pub cleanup_working_dir: bool,
    pub command_timeout_ms: u64,
    pub logging_level: String,
    pub output_path: String,
    pub output_include_containerfilesystem: bool,

    pub docker_image: String,
    pub docker_tar: String,
    pub docker_image_id: String,
    pub docker_image_repo: String,
    pub docker_image_tag: String,
    pub upload_bdio: bool,

    pub cleanup_target_image: bool,
    pub cleanup_inspector_container: bool,
    pub cleanup_inspector_image: bool,

    pub shared_dir_path_local: String,
    pub shared_dir_path_imageinspector: String,
    pub imageinspector_service_start: bool,
    pub service_host_port_alpine: u16,
    pub service_host_port_centos: u16,
    pub service_host_port_ubuntu: u16,
    pub imageinspector_service_distro_default: String,

    pub on_host: bool,
    pub caller_name: String,
    pub caller_version: String,
    pub inspector_repository: String,
    pub inspector_image_family: String,
    pub inspector_image_version: String,
    pub imageinspector_service_image_family: String,
    pub imageinspector_service_url: String,
    pub service_container_port_alpine: u16,
    pub service_container_port_centos: u16,
    pub service_container_port_ubuntu: u16,
    pub service_health_retries: u32,
    pub service_health_interval_ms: u64,
    pub inspector_binary_path: String,
    pub inspector_exec_options: String,
    pub inspector_command: String,
    pub imageinspector_local_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hub_url: String::new(),
            hub_timeout_secs: 120,
            hub_api_token: String::new(),
            hub_username: String::new(),
            hub_password: String::new(),
            hub_proxy_host: String::new(),
            hub_proxy_port: String::new(),
            hub_proxy_username: String::new(),
            hub_proxy_password: String::new(),
            hub_always_trust_cert: false,
            hub_project_name: String::new(),
            hub_project_version: String::new(),
            hub_codelocation_prefix: String::new(),
            working_dir_path: "/tmp/dockinspect-files".to_owned(),
            cleanup_working_dir: true,
            command_timeout_ms: 120_000,
            logging_level: "INFO".to_owned(),
            output_path: String::new(),
            output_include_containerfilesystem: false,
            docker_image: String::new(),
            docker_tar: String::new(),
            docker_image_id: String::new(),
            docker_image_repo: String::new(),
            docker_image_tag: String::new(),
            upload_bdio: true,
            cleanup_target_image: false,
            cleanup_inspector_container: true,
            cleanup_inspector_image: false,
            shared_dir_path_local: "/tmp/dockinspect-files/shared".to_owned(),
            shared_dir_path_imageinspector: "/opt/dockinspect/imageinspector-ws/shared".to_owned(),
            imageinspector_service_start: false,
            service_host_port_alpine: 9000,
            service_host_port_centos: 9001,
            service_host_port_ubuntu: 9002,
            imageinspector_service_distro_default: "ubuntu".to_owned(),
            on_host: true,
            caller_name: String::new(),
            caller_version: String::new(),
            inspector_repository: "dockinspect".to_owned(),
            inspector_image_family: "docker-inspector".to_owned(),
            inspector_image_version: "1.0.0".to_owned(),
            imageinspector_service_image_family: "imageinspector-ws".to_owned(),
            imageinspector_service_url: String::new(),
            service_container_port_alpine: 8080,
            service_container_port_centos: 8081,
            service_container_port_ubuntu: 8082,
            service_health_retries: 30,
            service_health_interval_ms: 2000,
            inspector_binary_path: String::new(),
            inspector_exec_options: String::new(),
            inspector_command: "/opt/dockinspect/bin/dockinspect-inspect".to_owned(),
            imageinspector_local_command: "/opt/dockinspect/bin/imageinspector".to_owned(),
        }
    }
}

impl Config {
    /// 설정 파일, 환경변수, 명령줄 속성을 순서대로 적용하고 검증합니다.
    ///
    /// `path`가 `None`이면 파일 단계를 건너뜁니다.
    pub async fn load(
        path: Option<&Path>,
        overrides: &[(String, String)],
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.apply_properties(overrides)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::ReadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::parse(&content)
    }

    /// TOML 문자열을 기본값 위에 적용합니다.
    ///
    /// 중첩 테이블은 점으로 이어진 키로 평탄화됩니다 (`[hub] url` → `hub.url`).
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(toml_str).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?;

        let mut entries = Vec::new();
        flatten_table(&table, "", &mut entries)?;

        let mut config = Self::default();
        config.apply_properties(&entries)?;
        Ok(config)
    }

    /// 테이블에서 키에 해당하는 옵션을 찾습니다.
    pub fn option(key: &str) -> Option<&'static ConfigOption> {
        OPTIONS.iter().find(|opt| opt.key == key)
    }

    /// 키로 값을 설정합니다.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let option = Self::option(key).ok_or_else(|| ConfigError::UnknownKey(key.to_owned()))?;
        (option.set)(self, value)
    }

    /// 키로 현재 값을 읽습니다.
    pub fn get(&self, key: &str) -> Option<String> {
        Self::option(key).map(|option| (option.get)(self))
    }

    /// `key=value` 쌍을 순서대로 적용합니다.
    pub fn apply_properties(&mut self, properties: &[(String, String)]) -> Result<(), ConfigError> {
        for (key, value) in properties {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `DOCKINSPECT_{KEY}` (점은 밑줄로)
    /// 예: `DOCKINSPECT_HUB_PASSWORD=secret`
    pub fn apply_env_overrides(&mut self) {
        for option in OPTIONS {
            let env_key = option.env_key();
            if let Ok(value) = std::env::var(&env_key) {
                if let Err(e) = (option.set)(self, &value) {
                    warn!(
                        env_key = env_key.as_str(),
                        error = %e,
                        "failed to parse env var, ignoring"
                    );
                }
            }
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.logging_level.to_ascii_uppercase().as_str()) {
            return Err(ConfigError::invalid(
                "logging.level",
                format!("must be one of: {}", VALID_LOG_LEVELS.join(", ")),
            ));
        }

        if self.command_timeout_ms == 0 {
            return Err(ConfigError::invalid("command.timeout", "must be greater than 0"));
        }

        if self.hub_timeout_secs == 0 {
            return Err(ConfigError::invalid("hub.timeout", "must be greater than 0"));
        }

        if self.working_dir_path.trim().is_empty() {
            return Err(ConfigError::invalid("working.dir.path", "must not be empty"));
        }

        for (field, value) in [
            ("shared.dir.path.local", &self.shared_dir_path_local),
            ("shared.dir.path.imageinspector", &self.shared_dir_path_imageinspector),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::invalid(field, "must be an absolute path"));
            }
        }

        self.inspector_os_default()?;

        for os in InspectorOs::ALL {
            if self.service_host_port(os) == 0 || self.service_container_port(os) == 0 {
                return Err(ConfigError::invalid(
                    format!("imageinspector.service.port.{os}"),
                    "ports must be 1-65535",
                ));
            }
        }

        if self.service_health_retries == 0 {
            return Err(ConfigError::invalid(
                "imageinspector.service.health.retries",
                "must be at least 1",
            ));
        }

        let url = self.imageinspector_service_url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "imageinspector.service.url",
                "must start with http:// or https://",
            ));
        }

        if !self.docker_image.trim().is_empty() {
            ImageRef::parse(&self.docker_image)?;
        }

        Ok(())
    }

    /// 공개 옵션을 키 순서로 반환합니다.
    pub fn public_options() -> Vec<&'static ConfigOption> {
        let mut options: Vec<_> = OPTIONS
            .iter()
            .filter(|opt| opt.group == OptionGroup::Public)
            .collect();
        options.sort_by_key(|opt| opt.key);
        options
    }

    /// 표시용 (키, 값) 목록을 반환합니다. 비밀 값은 가려집니다.
    pub fn masked_entries(&self) -> Vec<(&'static str, String)> {
        OPTIONS
            .iter()
            .map(|opt| {
                let value = (opt.get)(self);
                if opt.is_secret() && !value.is_empty() {
                    (opt.key, "********".to_owned())
                } else {
                    (opt.key, value)
                }
            })
            .collect()
    }

    /// 명령 타임아웃
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// 컨테이너 정지 타임아웃 (엔진 단위: 초, 최소 1)
    pub fn stop_timeout_secs(&self) -> i64 {
        i64::try_from(self.command_timeout_ms / 1000).unwrap_or(i64::MAX).max(1)
    }

    /// 기본 검사 서비스 배포판
    pub fn inspector_os_default(&self) -> Result<InspectorOs, ConfigError> {
        self.imageinspector_service_distro_default.parse()
    }

    pub fn service_host_port(&self, os: InspectorOs) -> u16 {
        match os {
            InspectorOs::Alpine => self.service_host_port_alpine,
            InspectorOs::Centos => self.service_host_port_centos,
            InspectorOs::Ubuntu => self.service_host_port_ubuntu,
        }
    }

    pub fn service_container_port(&self, os: InspectorOs) -> u16 {
        match os {
            InspectorOs::Alpine => self.service_container_port_alpine,
            InspectorOs::Centos => self.service_container_port_centos,
            InspectorOs::Ubuntu => self.service_container_port_ubuntu,
        }
    }

    /// 직접 실행 전략에서 사용하는 검사기 이미지
    pub fn exec_inspector_image(&self) -> ImageRef {
        ImageRef::new(
            format!("{}/{}", self.inspector_repository, self.inspector_image_family),
            self.inspector_image_version.clone(),
        )
    }

    /// 배포판별 검사 서비스 이미지
    pub fn service_image(&self, os: InspectorOs) -> ImageRef {
        ImageRef::new(
            format!(
                "{}/{}-{os}",
                self.inspector_repository, self.imageinspector_service_image_family
            ),
            self.inspector_image_version.clone(),
        )
    }

    /// 호스트에서 본 배포판별 검사 서비스 URL
    pub fn local_service_url(&self, os: InspectorOs) -> String {
        format!("http://localhost:{}", self.service_host_port(os))
    }
}

fn flatten_table(
    table: &toml::Table,
    prefix: &str,
    out: &mut Vec<(String, String)>,
) -> Result<(), ConfigError> {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::Table(inner) => flatten_table(inner, &key, out)?,
            toml::Value::String(s) => out.push((key, s.clone())),
            toml::Value::Integer(i) => out.push((key, i.to_string())),
            toml::Value::Boolean(b) => out.push((key, b.to_string())),
            toml::Value::Float(_) | toml::Value::Array(_) | toml::Value::Datetime(_) => {
                return Err(ConfigError::invalid(
                    key,
                    "only string, integer, and boolean values are supported",
                ));
            }
        }
    }
    Ok(())
}
