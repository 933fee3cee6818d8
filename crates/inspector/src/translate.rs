//! 공유 디렉토리 경로 변환
//!
//! 검사 서비스에 넘기는 모든 경로는 오케스트레이터의 호스트 경로에서
//! 서비스 컨테이너의 마운트 지점 기준 경로로 바뀌어야 합니다.
//! 접두어만 다르고 상대 경로는 같습니다. 변환은 이 모듈에서만 수행합니다.

use std::path::{Component, Path, PathBuf};

use dockinspect_core::paths::ProgramPaths;

use crate::error::InspectorError;

/// 호스트 공유 디렉토리와 컨테이너 마운트 지점의 대응
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedDirMapping {
    local_root: PathBuf,
    container_root: String,
}

impl SharedDirMapping {
    pub fn new(local_root: impl Into<PathBuf>, container_root: impl Into<String>) -> Self {
        let container_root: String = container_root.into();
        Self {
            local_root: local_root.into(),
            container_root: container_root.trim_end_matches('/').to_owned(),
        }
    }

    pub fn from_paths(paths: &ProgramPaths) -> Self {
        Self::new(paths.shared_local_dir(), paths.shared_container_dir())
    }

    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    /// 호스트 경로를 컨테이너 경로로 바꿉니다.
    ///
    /// # Errors
    ///
    /// 경로가 공유 디렉토리 밖에 있으면 `InspectorError::Io`를 반환합니다.
    pub fn to_container(&self, host_path: &Path) -> Result<String, InspectorError> {
        let relative = host_path.strip_prefix(&self.local_root).map_err(|_| {
            InspectorError::io(
                host_path,
                format!(
                    "not under the shared directory {}",
                    self.local_root.display()
                ),
            )
        })?;

        let mut out = self.container_root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    out.push('/');
                    out.push_str(&part.to_string_lossy());
                }
                Component::CurDir => {}
                _ => {
                    return Err(InspectorError::io(
                        host_path,
                        "path escapes the shared directory",
                    ));
                }
            }
        }
        Ok(out)
    }

    /// 컨테이너 경로를 호스트 경로로 바꿉니다.
    pub fn to_local(&self, container_path: &str) -> Result<PathBuf, InspectorError> {
        let relative = container_path
            .strip_prefix(&self.container_root)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| {
                InspectorError::io(
                    container_path,
                    format!("not under the mount point {}", self.container_root),
                )
            })?;

        let mut out = self.local_root.clone();
        for part in relative.split('/').filter(|p| !p.is_empty()) {
            out.push(part);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn mapping() -> SharedDirMapping {
        SharedDirMapping::new(
            "/tmp/dockinspect-files/shared",
            "/opt/dockinspect/imageinspector-ws/shared/",
        )
    }

    #[test]
    fn translates_host_path_to_mount_point() {
        let translated = mapping()
            .to_container(Path::new("/tmp/dockinspect-files/shared/target/ghost_1.0.tar"))
            .unwrap();
        assert_eq!(
            translated,
            "/opt/dockinspect/imageinspector-ws/shared/target/ghost_1.0.tar"
        );
    }

    #[test]
    fn rejects_path_outside_shared_dir() {
        let err = mapping()
            .to_container(Path::new("/home/user/ghost.tar"))
            .unwrap_err();
        assert!(err.to_string().contains("not under the shared directory"));
    }

    #[test]
    fn rejects_parent_traversal() {
        assert!(
            mapping()
                .to_container(Path::new("/tmp/dockinspect-files/shared/../secret"))
                .is_err()
        );
    }

    #[test]
    fn to_local_rejects_sibling_prefix() {
        assert!(
            mapping()
                .to_local("/opt/dockinspect/imageinspector-ws/shared-other/x")
                .is_err()
        );
    }

    proptest! {
        #[test]
        fn round_trip_preserves_suffix(parts in prop::collection::vec("[A-Za-z0-9_.-]{1,12}", 1..5)) {
            prop_assume!(parts.iter().all(|p| p != "." && p != ".."));
            let m = mapping();
            let mut host = m.local_root().to_path_buf();
            for part in &parts {
                host.push(part);
            }

            let in_container = m.to_container(&host).unwrap();
            prop_assert!(in_container.ends_with(&parts.join("/")));

            let back = m.to_local(&in_container).unwrap();
            prop_assert_eq!(back, host);
        }
    }
}
