//! 파이프라인 trait — 모듈 생명주기 정의
//!
//! 호스트 어댑터처럼 백그라운드 태스크를 가진 모듈은 [`Pipeline`]을 구현하여
//! 데몬에서 동일한 방식(start/stop/health_check)으로 관리됩니다.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::PagerpostError;

/// 모듈 건강 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// 정상
    Healthy,
    /// 동작하지만 일부 기능 저하
    Degraded(String),
    /// 비정상
    Unhealthy(String),
}

impl HealthStatus {
    /// 정상 상태인지 확인합니다.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded(reason) => write!(f, "degraded: {reason}"),
            Self::Unhealthy(reason) => write!(f, "unhealthy: {reason}"),
        }
    }
}

/// 백그라운드 처리를 가진 모듈의 생명주기 trait
///
/// # 생명주기
/// ```text
/// Initialized → start() → Running → stop() → Stopped
/// ```
pub trait Pipeline: Send {
    /// 모듈을 시작합니다.
    ///
    /// 이미 실행 중이면 `PipelineError::AlreadyRunning`을 반환합니다.
    fn start(&mut self) -> impl Future<Output = Result<(), PagerpostError>> + Send;

    /// 모듈을 정지합니다.
    ///
    /// 실행 중이 아니면 `PipelineError::NotRunning`을 반환합니다.
    fn stop(&mut self) -> impl Future<Output = Result<(), PagerpostError>> + Send;

    /// 모듈의 건강 상태를 확인합니다.
    fn health_check(&self) -> impl Future<Output = HealthStatus> + Send;
}
