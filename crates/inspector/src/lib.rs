//! # dockinspect-inspector
//!
//! 컨테이너 이미지 검사 전략 오케스트레이터입니다. 설정에 따라 세 가지
//! 검사 백엔드 중 하나를 골라 실행하고, 그 백엔드가 사용하는 컨테이너
//! 자원의 수명주기를 관리합니다.
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 타입 (`InspectorError`)
//! - [`docker`]: 컨테이너 엔진 추상화 (`DockerClient` trait, `BollardDockerClient`)
//! - [`ledger`]: 이번 실행이 만든 자원 기록 및 정리 (`ResourceLedger`)
//! - [`properties`]: 중첩 검사기에 넘기는 속성 파일 (`HandoffProperties`)
//! - [`lifecycle`]: 풀/저장/실행/재조정 (`ContainerLifecycle`)
//! - [`translate`]: 공유 디렉토리 경로 변환 (`SharedDirMapping`)
//! - [`strategy`]: 전략 선택 (`Strategy`, `select`)
//! - [`health`]: 서비스 헬스 폴링
//! - [`client`]: 전략별 검사 클라이언트 (`InspectionClient`, 컨테이너 내부용 `LocalInspector`)
//! - [`orchestrator`]: 한 번의 실행 전체 (`Orchestrator`, `ResultSink`)
//!
//! # Architecture
//!
//! ```text
//! Orchestrator ──> strategy::select ──> InspectionClient
//!                                            |
//!                                  ContainerLifecycle ──> DockerClient ──> engine
//!                                            |
//!                                  ImageInspectorApi ──HTTP──> inspector service
//! ```

pub mod client;
pub mod docker;
pub mod error;
pub mod health;
pub mod ledger;
pub mod lifecycle;
pub mod orchestrator;
pub mod properties;
pub mod strategy;
pub mod translate;

// --- Public API Re-exports ---

// Orchestrator
pub use orchestrator::{DiscardSink, Orchestrator, ResultSink, RunReport};

// Error
pub use error::InspectorError;

// Docker API
pub use docker::{BollardDockerClient, ContainerFilter, ContainerSpec, DockerClient, ExecOutput};

// Strategy and clients
pub use client::{ImageInspectorApi, InspectionClient, LocalInspector};
pub use strategy::Strategy;

// Lifecycle
pub use ledger::ResourceLedger;
pub use lifecycle::{ContainerLifecycle, PreparedArchive, SCAN_CLI_OPTS_ENV};
pub use translate::SharedDirMapping;
