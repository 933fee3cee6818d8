//! dockinspect 공통 크레이트
//!
//! 모든 dockinspect 크레이트가 공유하는 설정, 에러, 도메인 타입,
//! 경로 규칙을 제공합니다.

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::ConfigError;

// 설정
pub use config::{Config, ConfigOption, OPTIONS, OptionGroup, ValueType};

// 경로
pub use paths::ProgramPaths;

// 도메인 타입
pub use types::{
    ContainerSummary, ImageRef, ImageSummary, InspectionRequest, InspectionResult, InspectorOs,
    ResourceHandle, ResourceKind, Target,
};
