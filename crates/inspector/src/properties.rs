//! 중첩 검사기에 전달하는 설정 파일
//!
//! 직접 실행 컨테이너 안의 검사기는 `application.toml` 파일로
//! 입력 아카이브, 대상 이미지, 동작 플래그를 받습니다. 파일은
//! [`Config::parse`]가 그대로 읽는 TOML이며 옵션 테이블에 있는 키만 씁니다.
//! 중첩 실행은 항상 컨테이너 내부(`on.host = false`)에서 오프라인으로
//! 동작하고 업로드하지 않습니다.

use std::path::Path;

use tracing::debug;

use dockinspect_core::config::Config;
use dockinspect_core::paths::{CONTAINER_PROGRAM_DIR, PROPERTY_FILENAME};

use crate::error::InspectorError;

/// 중첩 실행 설정 내용
///
/// 키는 점으로 이어진 옵션 키 그대로(`"docker.tar" = ".."`) 기록되므로
/// `docker.image`와 `docker.image.repo` 같은 접두 관계 키도 충돌하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandoffProperties {
    entries: toml::Table,
}

impl HandoffProperties {
    /// 중첩 실행용 설정을 구성합니다.
    ///
    /// - `container_archive_path`: 컨테이너 안에서 본 이미지 아카이브 경로
    /// - `repo`, `tag`: 알려진 경우 아카이브의 이미지 이름 (모르면 빈 문자열)
    pub fn for_nested_run(
        config: &Config,
        container_archive_path: &str,
        repo: &str,
        tag: &str,
    ) -> Self {
        let mut props = Self::default();
        props
            .set("docker.tar", container_archive_path)
            .set("working.dir.path", CONTAINER_PROGRAM_DIR)
            .set("logging.level", config.logging_level.to_ascii_uppercase())
            .set_bool("on.host", false)
            .set_bool("upload.bdio", false)
            .set_bool("cleanup.working.dir", false)
            .set_bool(
                "output.include.containerfilesystem",
                config.output_include_containerfilesystem,
            );

        for (key, value) in [
            ("docker.image.repo", repo),
            ("docker.image.tag", tag),
            ("hub.project.name", config.hub_project_name.as_str()),
            ("hub.project.version", config.hub_project_version.as_str()),
            ("hub.codelocation.prefix", config.hub_codelocation_prefix.as_str()),
            ("caller.name", config.caller_name.as_str()),
            ("caller.version", config.caller_version.as_str()),
        ] {
            if !value.trim().is_empty() {
                props.set(key, value.trim());
            }
        }
        props
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries
            .insert(key.into(), toml::Value::String(value.into()));
        self
    }

    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.entries.insert(key.into(), toml::Value::Boolean(value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// TOML 문서로 직렬화합니다.
    pub fn render(&self) -> Result<String, InspectorError> {
        let body = toml::to_string(&self.entries)
            .map_err(|e| InspectorError::io(PROPERTY_FILENAME, e))?;
        Ok(format!(
            "# generated by dockinspect for a nested inspector run\n{body}"
        ))
    }

    /// 파일로 저장합니다. 상위 디렉토리가 없으면 생성합니다.
    pub async fn write_to(&self, path: &Path) -> Result<(), InspectorError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InspectorError::io(parent, e))?;
        }
        tokio::fs::write(path, self.render()?)
            .await
            .map_err(|e| InspectorError::io(path, e))?;
        debug!(path = %path.display(), entries = self.entries.len(), "wrote property file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dockinspect_core::types::Target;

    use super::*;

    fn nested(config: &Config) -> HandoffProperties {
        HandoffProperties::for_nested_run(
            config,
            "/opt/dockinspect/target/alpine_3.6.tar",
            "alpine",
            "3.6",
        )
    }

    #[test]
    fn nested_run_forces_offline_flags() {
        let config = Config {
            hub_project_name: "proj".to_owned(),
            output_include_containerfilesystem: true,
            ..Config::default()
        };
        let props = nested(&config);

        assert_eq!(props.get("on.host"), Some(&toml::Value::Boolean(false)));
        assert_eq!(props.get("upload.bdio"), Some(&toml::Value::Boolean(false)));
        assert_eq!(
            props.get("output.include.containerfilesystem"),
            Some(&toml::Value::Boolean(true))
        );
        assert_eq!(
            props.get("hub.project.name"),
            Some(&toml::Value::String("proj".to_owned()))
        );
        assert_eq!(props.get("hub.project.version"), None);
    }

    #[test]
    fn only_known_option_keys_are_written() {
        let config = Config {
            caller_name: "detect".to_owned(),
            hub_codelocation_prefix: "pre".to_owned(),
            ..Config::default()
        };
        let props = nested(&config);
        for key in props.keys() {
            assert!(Config::option(key).is_some(), "unknown key {key}");
        }
    }

    #[test]
    fn rendered_file_loads_as_nested_config() {
        let config = Config {
            logging_level: "debug".to_owned(),
            hub_project_version: "1.0 beta".to_owned(),
            ..Config::default()
        };
        let rendered = nested(&config).render().unwrap();

        let parsed = Config::parse(&rendered).unwrap();

        assert!(!parsed.on_host);
        assert!(!parsed.upload_bdio);
        assert!(!parsed.cleanup_working_dir);
        assert_eq!(parsed.docker_tar, "/opt/dockinspect/target/alpine_3.6.tar");
        assert_eq!(parsed.docker_image_repo, "alpine");
        assert_eq!(parsed.docker_image_tag, "3.6");
        assert_eq!(parsed.working_dir_path, "/opt/dockinspect");
        assert_eq!(parsed.logging_level, "DEBUG");
        assert_eq!(parsed.hub_project_version, "1.0 beta");
        parsed.validate().unwrap();
        assert!(matches!(
            Target::from_config(&parsed).unwrap(),
            Target::Archive { .. }
        ));
    }

    #[test]
    fn special_characters_survive_round_trip() {
        let mut props = HandoffProperties::default();
        props.set("docker.tar", "/opt/dockinspect/target/a=b:c #1.tar");
        let parsed = Config::parse(&props.render().unwrap()).unwrap();
        assert_eq!(parsed.docker_tar, "/opt/dockinspect/target/a=b:c #1.tar");
    }

    #[tokio::test]
    async fn write_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("application.toml");
        let mut props = HandoffProperties::default();
        props.set_bool("on.host", false);

        props.write_to(&path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"on.host\" = false"));
    }
}
