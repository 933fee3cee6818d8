//! 에러 타입 — 설정 계층의 에러 정의
//!
//! [`ConfigError`]는 설정 로딩, 검증, 대상(Target) 결정, 전략 선택 단계에서
//! 발생하는 모든 에러를 표현합니다. 이 에러들은 컨테이너 엔진 호출 전에
//! 발생하므로 항상 치명적입니다.

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파일 읽기 실패
    #[error("failed to read config file {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 알 수 없는 설정 키
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 검사 대상을 결정할 수 없음
    #[error("invalid inspection target: {reason}")]
    InvalidTarget { reason: String },

    /// 적용 가능한 검사 전략이 없음
    #[error(
        "no inspection strategy applies: provide imageinspector.service.url for existing services, \
         set imageinspector.service.start=true, or run on the host for direct exec"
    )]
    NoStrategy,

    /// 둘 이상의 검사 전략이 적용 가능함
    #[error("ambiguous inspection strategy configuration: {candidates} all apply")]
    AmbiguousStrategy { candidates: String },
}

impl ConfigError {
    /// 필드명과 사유로 `InvalidValue` 에러를 생성합니다.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let err = ConfigError::FileNotFound {
            path: "/etc/dockinspect.toml".to_owned(),
        };
        assert!(err.to_string().contains("/etc/dockinspect.toml"));
    }

    #[test]
    fn invalid_value_names_field() {
        let err = ConfigError::invalid("command.timeout", "must be greater than 0");
        let msg = err.to_string();
        assert!(msg.contains("command.timeout"));
        assert!(msg.contains("must be greater than 0"));
    }

    #[test]
    fn ambiguous_strategy_lists_candidates() {
        let err = ConfigError::AmbiguousStrategy {
            candidates: "service-existing, service-on-demand".to_owned(),
        };
        assert!(err.to_string().contains("service-on-demand"));
    }

    #[test]
    fn unknown_key_display() {
        let err = ConfigError::UnknownKey("hub.urll".to_owned());
        assert_eq!(err.to_string(), "unknown config key: hub.urll");
    }
}
