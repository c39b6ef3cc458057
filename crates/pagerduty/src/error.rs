//! PagerDuty 클라이언트 에러 타입
//!
//! [`PagerDutyError`]는 Events API 호출 중 발생하는 모든 에러를 표현합니다.
//! 재시도 루프는 [`PagerDutyError::is_retryable`]로 일시적 실패만 다시 시도하며,
//! 최종 실패는 `DeliveryResult`의 메시지로 변환되어 호출자에게 전달됩니다.

use pagerpost_core::error::{ConfigError, PagerpostError};

/// PagerDuty 클라이언트 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum PagerDutyError {
    /// Events API가 2xx가 아닌 응답을 반환함
    #[error("pagerduty responded with status {status}: {message}")]
    Http {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문에서 추출한 메시지
        message: String,
    },

    /// 연결 실패 등 전송 계층 에러
    #[error("pagerduty request failed: {0}")]
    Transport(String),

    /// 요청 타임아웃
    #[error("pagerduty request timed out")]
    Timeout,

    /// HTTP 클라이언트 생성 실패
    #[error("failed to build http client: {0}")]
    Build(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl PagerDutyError {
    /// 재시도할 가치가 있는 일시적 실패인지 판단합니다.
    ///
    /// 429, 5xx, 전송 실패, 타임아웃은 일시적이며
    /// 그 외 4xx는 요청 자체가 잘못된 것이므로 재시도하지 않습니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) | Self::Timeout => true,
            Self::Build(_) | Self::Config { .. } => false,
        }
    }
}

impl From<reqwest::Error> for PagerDutyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<PagerDutyError> for PagerpostError {
    fn from(err: PagerDutyError) -> Self {
        match err {
            PagerDutyError::Config { field, reason } => {
                PagerpostError::Config(ConfigError::InvalidValue { field, reason })
            }
            other => PagerpostError::Delivery(other.to_string()),
        }
    }
}
