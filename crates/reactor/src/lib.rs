//! Pagerpost 이벤트 리액터
//!
//! 로그 호스트가 전달하는 이벤트를 관찰하고, 조건에 맞는 이벤트마다
//! 온콜 서비스(PagerDuty)에 인시던트를 생성하거나 갱신합니다.
//!
//! # 모듈 구성
//!
//! - [`config`]: 리액터 설정 해석 (`ReactorConfig`, builder, `split_lines`)
//! - [`extract`]: 이벤트 속성 조회 및 인시던트 요청 생성
//! - [`reactor`]: 이벤트 하나를 처리하는 리액터 (`Reactor`, `HandleOutcome`)
//! - [`host`]: 채널 기반 호스트 어댑터 (Pipeline trait 구현)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! LogEvent --mpsc--> ReactorHost --min_level--> Reactor::handle
//!                                                  |
//!                                       extract::build_request
//!                                                  |
//!                                       IncidentClient::trigger
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod host;
pub mod reactor;

#[cfg(test)]
mod testing;

// --- 주요 타입 re-export ---

// 리액터
pub use reactor::{HandleOutcome, Reactor};

// 설정
pub use config::{DEFAULT_APPLICATION_NAME, ReactorConfig, ReactorConfigBuilder, split_lines};

// 호스트
pub use host::{HostStats, ReactorHost, ReactorHostBuilder};

// 에러
pub use error::ReactorError;
