//! 검사 전략 선택
//!
//! 설정만 보고 세 가지 전략 중 하나를 고르는 순수 함수입니다.
//! 적용 조건은 고정된 우선순위로 평가합니다.
//!
//! 1. Service-Existing: 서비스 URL이 있고 서비스 시작을 요청하지 않음
//! 2. Service-On-Demand: 서비스 시작을 요청함 (URL 유무와 무관)
//! 3. Direct-Exec: 위 둘 다 아님

use std::fmt;

use dockinspect_core::config::Config;
use dockinspect_core::error::ConfigError;

/// 검사 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    ServiceExisting,
    ServiceOnDemand,
    DirectExec,
}

impl Strategy {
    /// 평가 순서
    pub const PRIORITY: [Strategy; 3] = [
        Self::ServiceExisting,
        Self::ServiceOnDemand,
        Self::DirectExec,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ServiceExisting => "service-existing",
            Self::ServiceOnDemand => "service-on-demand",
            Self::DirectExec => "direct-exec",
        }
    }

    /// 이 전략이 설정에 적용 가능한지 확인합니다.
    pub fn is_applicable(&self, config: &Config) -> bool {
        let has_url = !config.imageinspector_service_url.trim().is_empty();
        let start = config.imageinspector_service_start;
        match self {
            Self::ServiceExisting => has_url && !start,
            Self::ServiceOnDemand => start,
            Self::DirectExec => !has_url && !start,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 적용 가능한 전략을 정확히 하나 고릅니다.
///
/// # Errors
///
/// 적용 가능한 전략이 없으면 `ConfigError::NoStrategy`,
/// 둘 이상이면 `ConfigError::AmbiguousStrategy`를 반환합니다.
pub fn select(config: &Config) -> Result<Strategy, ConfigError> {
    let applicable: Vec<Strategy> = Strategy::PRIORITY
        .into_iter()
        .filter(|s| s.is_applicable(config))
        .collect();

    match applicable.as_slice() {
        [] => Err(ConfigError::NoStrategy),
        [only] => Ok(*only),
        several => Err(ConfigError::AmbiguousStrategy {
            candidates: several
                .iter()
                .map(Strategy::name)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, start: bool) -> Config {
        Config {
            imageinspector_service_url: url.to_owned(),
            imageinspector_service_start: start,
            ..Config::default()
        }
    }

    #[test]
    fn url_without_start_selects_existing() {
        assert_eq!(
            select(&config("http://localhost:9000", false)).unwrap(),
            Strategy::ServiceExisting
        );
    }

    #[test]
    fn start_selects_on_demand_regardless_of_url() {
        assert_eq!(select(&config("", true)).unwrap(), Strategy::ServiceOnDemand);
        assert_eq!(
            select(&config("http://localhost:9000", true)).unwrap(),
            Strategy::ServiceOnDemand
        );
    }

    #[test]
    fn neither_selects_direct_exec() {
        assert_eq!(select(&config("", false)).unwrap(), Strategy::DirectExec);
        assert_eq!(select(&config("   ", false)).unwrap(), Strategy::DirectExec);
    }

    #[test]
    fn exactly_one_strategy_applies_for_every_input() {
        for url in ["", "http://localhost:9000"] {
            for start in [false, true] {
                let cfg = config(url, start);
                let count = Strategy::PRIORITY
                    .iter()
                    .filter(|s| s.is_applicable(&cfg))
                    .count();
                assert_eq!(count, 1, "url={url:?} start={start}");
            }
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(Strategy::DirectExec.to_string(), "direct-exec");
        assert_eq!(Strategy::ServiceOnDemand.to_string(), "service-on-demand");
    }
}
