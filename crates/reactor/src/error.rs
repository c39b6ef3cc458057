//! 리액터 에러 타입
//!
//! [`ReactorError`]는 리액터 구성과 호스트 어댑터에서 발생하는 에러를 표현합니다.
//! 이벤트 처리 자체는 에러를 반환하지 않으며 (실패는 로그 한 줄로 끝남),
//! 여기 정의된 에러는 attach/start/join 같은 생명주기 단계에서만 발생합니다.

use pagerpost_core::error::{ConfigError, PagerpostError, PipelineError};

/// 리액터 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ReactorError {
    /// 이미 attach 된 리액터에 다시 attach 시도
    #[error("reactor is already attached")]
    AlreadyAttached,

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 호스트 구성 요소 누락 또는 채널 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// 디스패치 태스크가 비정상 종료됨
    #[error("dispatch task failed: {0}")]
    Dispatch(String),
}

impl From<ReactorError> for PagerpostError {
    fn from(err: ReactorError) -> Self {
        match err {
            ReactorError::Config { field, reason } => {
                PagerpostError::Config(ConfigError::InvalidValue { field, reason })
            }
            ReactorError::Channel(msg) => PagerpostError::Pipeline(PipelineError::ChannelSend(msg)),
            other => PagerpostError::Pipeline(PipelineError::InitFailed(other.to_string())),
        }
    }
}
