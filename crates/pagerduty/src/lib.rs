//! PagerDuty 인시던트 클라이언트
//!
//! 리액터가 사용하는 인시던트 생성 기능을 [`IncidentClient`] trait으로 추상화하고,
//! PagerDuty Events API v2 구현체 [`PagerDutyClient`]를 제공합니다.
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 타입 (`PagerDutyError`)
//! - [`types`]: 요청/결과 값 타입 (`ClientInfo`, `IncidentRequest`, `DeliveryResult`)
//! - [`retry`]: 재시도 정책 (`RetryPolicy`, `Backoff`)
//! - [`client`]: 인시던트 클라이언트 trait (`IncidentClient`)
//! - [`events_v2`]: Events API v2 구현 (`PagerDutyClient`, builder)
//!
//! # Architecture
//!
//! ```text
//! Reactor --IncidentRequest--> IncidentClient::trigger()
//!                                   |
//!                              PagerDutyClient (retry loop)
//!                                   |
//!                              POST /v2/enqueue
//!                                   |
//!                              DeliveryResult
//! ```

pub mod client;
pub mod error;
pub mod events_v2;
pub mod retry;
pub mod types;

// --- Public API Re-exports ---

// Client capability
pub use client::IncidentClient;

// Events API v2
pub use events_v2::{PagerDutyClient, PagerDutyClientBuilder, Severity};

// Error
pub use error::PagerDutyError;

// Retry
pub use retry::{Backoff, RetryPolicy};

// Value types
pub use types::{ClientInfo, DeliveryResult, IncidentRequest};
