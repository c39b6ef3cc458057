//! Pagerpost 공통 크레이트
//!
//! 로그 이벤트를 PagerDuty 인시던트로 전달하는 모든 모듈이 공유하는
//! 에러, 설정, 이벤트 모델, 메트릭 이름, 생명주기 trait을 정의합니다.
//!
//! # 모듈 구성
//!
//! - [`config`]: `pagerpost.toml` 파싱, 환경변수 오버라이드, 유효성 검증
//! - [`error`]: 도메인 에러 타입
//! - [`event`]: 호스트가 전달하는 로그 이벤트와 속성 값
//! - [`metrics`]: 메트릭 이름 상수 및 설명 등록
//! - [`pipeline`]: 모듈 생명주기 trait

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod pipeline;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, PagerpostError, PipelineError};

// 설정
pub use config::{PagerpostConfig, ReactorSettings};

// 이벤트
pub use event::{LogEvent, LogLevel, PropertyValue};

// 파이프라인 trait
pub use pipeline::{HealthStatus, Pipeline};
