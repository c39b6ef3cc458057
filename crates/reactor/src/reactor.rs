//! 이벤트 리액터 -- 로그 이벤트 하나를 인시던트 하나로 변환하여 전송합니다.
//!
//! [`Reactor`]는 attach 되기 전까지 아무 일도 하지 않습니다.
//! attach 후에는 설정과 클라이언트를 읽기만 하므로 여러 태스크에서
//! 동시에 [`Reactor::handle`]을 호출해도 잠금이 필요 없습니다.
//!
//! # 처리 흐름
//! ```text
//! LogEvent -> extract::build_request -> IncidentClient::trigger -> DeliveryResult
//!                                                                     |
//!                                                        실패 시 error 로그 1줄
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use pagerpost_core::event::LogEvent;
use pagerpost_core::metrics as m;
use pagerpost_pagerduty::IncidentClient;

use crate::config::ReactorConfig;
use crate::error::ReactorError;
use crate::extract;

/// 이벤트 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// attach 전이라 무시됨
    Detached,
    /// 인시던트 전송 성공
    Delivered,
    /// 인시던트 전송 실패 (로그 기록됨)
    Failed,
}

impl fmt::Display for HandleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => write!(f, "detached"),
            Self::Delivered => write!(f, "delivered"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// attach 시점에 만들어지는 리액터 상태
struct Attachment<C> {
    config: ReactorConfig,
    client: Arc<C>,
}

/// 이벤트 리액터
///
/// # 사용 예시
/// ```ignore
/// use std::sync::Arc;
/// use pagerpost_reactor::{Reactor, ReactorConfig};
///
/// let mut reactor = Reactor::new();
/// reactor.attach(ReactorConfig::default(), Arc::new(client))?;
/// let outcome = reactor.handle(&event).await;
/// ```
pub struct Reactor<C: IncidentClient> {
    attachment: Option<Attachment<C>>,
}

impl<C: IncidentClient> Reactor<C> {
    /// attach 되지 않은 리액터를 생성합니다.
    pub fn new() -> Self {
        Self { attachment: None }
    }

    /// 설정과 클라이언트를 연결합니다.
    ///
    /// 이미 attach 되어 있으면 `ReactorError::AlreadyAttached`를 반환합니다.
    pub fn attach(&mut self, config: ReactorConfig, client: Arc<C>) -> Result<(), ReactorError> {
        if self.attachment.is_some() {
            return Err(ReactorError::AlreadyAttached);
        }

        info!(
            application = %config.application_name,
            additional_properties = config.additional_property_names.len(),
            dedup_property = config.incident_id_property_name.as_deref().unwrap_or(""),
            "reactor attached"
        );
        self.attachment = Some(Attachment { config, client });
        Ok(())
    }

    /// 설정과 클라이언트를 해제합니다. attach 되어 있지 않으면 아무 일도 하지 않습니다.
    pub fn detach(&mut self) {
        if self.attachment.take().is_some() {
            info!("reactor detached");
        }
    }

    /// attach 여부를 반환합니다.
    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// attach 된 설정을 반환합니다.
    pub fn config(&self) -> Option<&ReactorConfig> {
        self.attachment.as_ref().map(|a| &a.config)
    }

    /// 이벤트 하나를 처리합니다.
    ///
    /// 어떤 경우에도 에러를 반환하거나 panic 하지 않습니다.
    /// 전송 실패는 `event_id`를 담은 error 로그 한 줄로만 보고됩니다.
    pub async fn handle(&self, event: &LogEvent) -> HandleOutcome {
        let Some(attachment) = &self.attachment else {
            metrics::counter!(m::REACTOR_EVENTS_DETACHED_TOTAL).increment(1);
            return HandleOutcome::Detached;
        };
        metrics::counter!(m::REACTOR_EVENTS_HANDLED_TOTAL).increment(1);

        let request = extract::build_request(&attachment.config, event);

        let started = Instant::now();
        let result = attachment.client.trigger(&request).await;
        metrics::histogram!(m::REACTOR_DELIVERY_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());

        if result.success {
            metrics::counter!(m::REACTOR_DELIVERIES_TOTAL, m::LABEL_RESULT => "success")
                .increment(1);
            HandleOutcome::Delivered
        } else {
            metrics::counter!(m::REACTOR_DELIVERIES_TOTAL, m::LABEL_RESULT => "failure")
                .increment(1);
            error!(
                event_id = %event.id,
                reason = %result.message,
                "error sending event {} to PagerDuty: {}",
                event.id,
                result.message
            );
            HandleOutcome::Failed
        }
    }
}

impl<C: IncidentClient> Default for Reactor<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: IncidentClient> fmt::Debug for Reactor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactor")
            .field("attached", &self.is_attached())
            .field("config", &self.config())
            .finish()
    }
}
