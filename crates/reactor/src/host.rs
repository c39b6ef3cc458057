//! 호스트 어댑터 -- 채널로 들어오는 이벤트를 리액터에 하나씩 전달합니다.
//!
//! [`ReactorHost`]는 core의 [`Pipeline`](pagerpost_core::pipeline::Pipeline) trait을 구현하여
//! `pagerpost-daemon`에서 start/stop/health_check 생명주기로 관리됩니다.
//!
//! # 내부 아키텍처
//! ```text
//! event source -> mpsc -> dispatch task -> min_level filter -> Reactor::handle (한 번에 하나)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use pagerpost_core::error::{PagerpostError, PipelineError};
use pagerpost_core::event::{LogEvent, LogLevel};
use pagerpost_core::metrics as m;
use pagerpost_core::pipeline::{HealthStatus, Pipeline};
use pagerpost_pagerduty::IncidentClient;

use crate::error::ReactorError;
use crate::reactor::{HandleOutcome, Reactor};

/// 기본 채널 용량
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// 호스트 실행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    Initialized,
    Running,
    Stopped,
}

/// 디스패치 통계 (공유 카운터)
#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    filtered: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    detached: AtomicU64,
}

/// 호스트 통계 스냅샷
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    /// 채널에서 받은 이벤트 수
    pub received: u64,
    /// 최소 레벨 미달로 걸러진 이벤트 수
    pub filtered: u64,
    /// 전송 성공 수
    pub delivered: u64,
    /// 전송 실패 수
    pub failed: u64,
    /// 리액터가 attach 되지 않아 무시된 수
    pub detached: u64,
}

/// 리액터 호스트 어댑터
///
/// # 사용 예시
/// ```ignore
/// use pagerpost_reactor::ReactorHostBuilder;
///
/// let (mut host, event_tx) = ReactorHostBuilder::new(Arc::new(reactor))
///     .min_level(LogLevel::Error)
///     .build()?;
/// host.start().await?;
/// event_tx.expect("internal sender").send(event).await?;
/// ```
pub struct ReactorHost<C: IncidentClient> {
    reactor: Arc<Reactor<C>>,
    min_level: LogLevel,
    state: HostState,
    event_rx: Option<mpsc::Receiver<LogEvent>>,
    task: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl<C: IncidentClient> ReactorHost<C> {
    /// 현재 상태 이름을 반환합니다.
    pub fn state_name(&self) -> &str {
        match self.state {
            HostState::Initialized => "initialized",
            HostState::Running => "running",
            HostState::Stopped => "stopped",
        }
    }

    /// 최소 전달 레벨을 반환합니다.
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// 통계 스냅샷을 반환합니다.
    pub fn stats(&self) -> HostStats {
        HostStats {
            received: self.counters.received.load(Ordering::Relaxed),
            filtered: self.counters.filtered.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            detached: self.counters.detached.load(Ordering::Relaxed),
        }
    }

    /// 송신측이 모두 닫힌 뒤 디스패치 루프가 남은 이벤트를 처리하고 끝날 때까지 기다립니다.
    ///
    /// 실행 중이 아니면 즉시 반환합니다.
    pub async fn join(&mut self) -> Result<(), ReactorError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        let result = task.await;
        self.state = HostState::Stopped;
        let stats = self.stats();
        info!(
            received = stats.received,
            delivered = stats.delivered,
            failed = stats.failed,
            filtered = stats.filtered,
            "reactor host drained"
        );
        result.map_err(|e| ReactorError::Dispatch(e.to_string()))
    }
}

impl<C: IncidentClient> Pipeline for ReactorHost<C> {
    async fn start(&mut self) -> Result<(), PagerpostError> {
        if self.state == HostState::Running {
            return Err(PipelineError::AlreadyRunning.into());
        }
        let mut event_rx = self.event_rx.take().ok_or_else(|| {
            PagerpostError::from(PipelineError::InitFailed(
                "event receiver already consumed".to_owned(),
            ))
        })?;

        info!(min_level = %self.min_level, "starting reactor host");

        let reactor = Arc::clone(&self.reactor);
        let counters = Arc::clone(&self.counters);
        let min_level = self.min_level;

        self.task = Some(tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                counters.received.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(
                    m::HOST_EVENTS_RECEIVED_TOTAL,
                    m::LABEL_LEVEL => event.level.to_string()
                )
                .increment(1);

                if event.level < min_level {
                    counters.filtered.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!(m::HOST_EVENTS_FILTERED_TOTAL).increment(1);
                    continue;
                }

                let counter = match reactor.handle(&event).await {
                    HandleOutcome::Delivered => &counters.delivered,
                    HandleOutcome::Failed => &counters.failed,
                    HandleOutcome::Detached => &counters.detached,
                };
                counter.fetch_add(1, Ordering::Relaxed);
            }
            debug!("event channel closed, dispatch loop finished");
        }));

        self.state = HostState::Running;
        info!("reactor host started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), PagerpostError> {
        if self.state != HostState::Running {
            return Err(PipelineError::NotRunning.into());
        }

        info!("stopping reactor host");
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.state = HostState::Stopped;
        info!("reactor host stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            HostState::Running => {
                if self.task.as_ref().is_some_and(JoinHandle::is_finished) {
                    HealthStatus::Degraded("dispatch loop has exited".to_owned())
                } else if !self.reactor.is_attached() {
                    HealthStatus::Degraded("reactor is not attached".to_owned())
                } else {
                    HealthStatus::Healthy
                }
            }
            HostState::Initialized => HealthStatus::Unhealthy("not started".to_owned()),
            HostState::Stopped => HealthStatus::Unhealthy("stopped".to_owned()),
        }
    }
}

/// 리액터 호스트 빌더
///
/// 호스트를 구성하고 필요한 채널을 생성합니다.
pub struct ReactorHostBuilder<C: IncidentClient> {
    reactor: Arc<Reactor<C>>,
    min_level: LogLevel,
    channel_capacity: usize,
    event_rx: Option<mpsc::Receiver<LogEvent>>,
}

impl<C: IncidentClient> ReactorHostBuilder<C> {
    /// attach 된 리액터로 빌더를 생성합니다.
    pub fn new(reactor: Arc<Reactor<C>>) -> Self {
        Self {
            reactor,
            min_level: LogLevel::Verbose,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            event_rx: None,
        }
    }

    /// 리액터에 전달할 최소 레벨을 지정합니다.
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// 내부 채널 용량을 지정합니다 (외부 채널 미사용 시).
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// 외부 이벤트 수신 채널을 연결합니다.
    pub fn event_receiver(mut self, rx: mpsc::Receiver<LogEvent>) -> Self {
        self.event_rx = Some(rx);
        self
    }

    /// 호스트를 빌드합니다.
    ///
    /// # Returns
    /// - `ReactorHost`: 호스트 인스턴스
    /// - `Option<mpsc::Sender<LogEvent>>`: 이벤트 송신 채널
    ///   (외부 event_receiver를 설정한 경우 None)
    pub fn build(self) -> Result<(ReactorHost<C>, Option<mpsc::Sender<LogEvent>>), ReactorError> {
        let (event_rx, event_tx) = match self.event_rx {
            Some(rx) => (rx, None),
            None => {
                if self.channel_capacity == 0 {
                    return Err(ReactorError::Config {
                        field: "host.channel_capacity".to_owned(),
                        reason: "must be greater than 0".to_owned(),
                    });
                }
                let (tx, rx) = mpsc::channel(self.channel_capacity);
                (rx, Some(tx))
            }
        };

        let host = ReactorHost {
            reactor: self.reactor,
            min_level: self.min_level,
            state: HostState::Initialized,
            event_rx: Some(event_rx),
            task: None,
            counters: Arc::new(Counters::default()),
        };
        Ok((host, event_tx))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pagerpost_pagerduty::DeliveryResult;

    use super::*;
    use crate::config::ReactorConfig;
    use crate::testing::MockIncidentClient;

    fn attached(client: Arc<MockIncidentClient>) -> Arc<Reactor<MockIncidentClient>> {
        let mut reactor = Reactor::new();
        reactor
            .attach(ReactorConfig::default(), client)
            .expect("fresh reactor");
        Arc::new(reactor)
    }

    fn event(id: &str, level: LogLevel) -> LogEvent {
        LogEvent::new(id, format!("event {id}")).with_level(level)
    }

    #[test]
    fn builder_creates_host_with_sender() {
        let reactor = attached(Arc::new(MockIncidentClient::succeeding()));
        let (host, tx) = ReactorHostBuilder::new(reactor).build().unwrap();
        assert_eq!(host.state_name(), "initialized");
        assert_eq!(host.min_level(), LogLevel::Verbose);
        assert!(tx.is_some());
    }

    #[test]
    fn builder_with_external_receiver_returns_no_sender() {
        let reactor = attached(Arc::new(MockIncidentClient::succeeding()));
        let (_tx, rx) = mpsc::channel(4);
        let (_host, tx) = ReactorHostBuilder::new(reactor)
            .event_receiver(rx)
            .build()
            .unwrap();
        assert!(tx.is_none());
    }

    #[test]
    fn builder_rejects_zero_capacity() {
        let reactor = attached(Arc::new(MockIncidentClient::succeeding()));
        let result = ReactorHostBuilder::new(reactor).channel_capacity(0).build();
        assert!(matches!(result, Err(ReactorError::Config { .. })));
    }

    #[tokio::test]
    async fn host_lifecycle() {
        let reactor = attached(Arc::new(MockIncidentClient::succeeding()));
        let (mut host, _tx) = ReactorHostBuilder::new(reactor).build().unwrap();

        assert!(!host.health_check().await.is_healthy());

        host.start().await.unwrap();
        assert_eq!(host.state_name(), "running");
        assert!(host.health_check().await.is_healthy());

        host.stop().await.unwrap();
        assert_eq!(host.state_name(), "stopped");
        assert!(!host.health_check().await.is_healthy());
    }

    #[tokio::test]
    async fn start_twice_fails() {
        let reactor = attached(Arc::new(MockIncidentClient::succeeding()));
        let (mut host, _tx) = ReactorHostBuilder::new(reactor).build().unwrap();
        host.start().await.unwrap();
        assert!(host.start().await.is_err());
        host.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_without_start_fails() {
        let reactor = attached(Arc::new(MockIncidentClient::succeeding()));
        let (mut host, _tx) = ReactorHostBuilder::new(reactor).build().unwrap();
        assert!(host.stop().await.is_err());
    }

    #[tokio::test]
    async fn dispatches_events_in_order_and_drains_on_join() {
        let client = Arc::new(MockIncidentClient::succeeding());
        let reactor = attached(Arc::clone(&client));
        let (mut host, tx) = ReactorHostBuilder::new(reactor).build().unwrap();
        let tx = tx.unwrap();

        host.start().await.unwrap();
        for id in ["1", "2", "3"] {
            tx.send(event(id, LogLevel::Error)).await.unwrap();
        }
        drop(tx);
        host.join().await.unwrap();

        let messages: Vec<_> = client.requests().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["event 1", "event 2", "event 3"]);
        assert_eq!(host.stats().delivered, 3);
        assert_eq!(host.state_name(), "stopped");
    }

    #[tokio::test]
    async fn events_below_min_level_are_filtered() {
        let client = Arc::new(MockIncidentClient::succeeding());
        let reactor = attached(Arc::clone(&client));
        let (mut host, tx) = ReactorHostBuilder::new(reactor)
            .min_level(LogLevel::Error)
            .build()
            .unwrap();
        let tx = tx.unwrap();

        host.start().await.unwrap();
        tx.send(event("info", LogLevel::Information)).await.unwrap();
        tx.send(event("warn", LogLevel::Warning)).await.unwrap();
        tx.send(event("err", LogLevel::Error)).await.unwrap();
        tx.send(event("fatal", LogLevel::Fatal)).await.unwrap();
        drop(tx);
        host.join().await.unwrap();

        let stats = host.stats();
        assert_eq!(stats.received, 4);
        assert_eq!(stats.filtered, 2);
        assert_eq!(stats.delivered, 2);
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn failures_are_counted_and_do_not_stop_dispatch() {
        let client = Arc::new(MockIncidentClient::returning(DeliveryResult::failure(
            "boom",
        )));
        let reactor = attached(Arc::clone(&client));
        let (mut host, tx) = ReactorHostBuilder::new(reactor).build().unwrap();
        let tx = tx.unwrap();

        host.start().await.unwrap();
        tx.send(event("a", LogLevel::Error)).await.unwrap();
        tx.send(event("b", LogLevel::Error)).await.unwrap();
        drop(tx);
        host.join().await.unwrap();

        assert_eq!(host.stats().failed, 2);
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn detached_reactor_is_degraded_and_ignores_events() {
        let reactor: Arc<Reactor<MockIncidentClient>> = Arc::new(Reactor::new());
        let (mut host, tx) = ReactorHostBuilder::new(reactor).build().unwrap();
        let tx = tx.unwrap();

        host.start().await.unwrap();
        assert!(matches!(
            host.health_check().await,
            HealthStatus::Degraded(_)
        ));
        tx.send(event("x", LogLevel::Fatal)).await.unwrap();
        drop(tx);
        host.join().await.unwrap();

        assert_eq!(host.stats().detached, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_client_serializes_delivery() {
        let client = Arc::new(
            MockIncidentClient::succeeding().with_delay(Duration::from_secs(5)),
        );
        let reactor = attached(Arc::clone(&client));
        let (mut host, tx) = ReactorHostBuilder::new(reactor).build().unwrap();
        let tx = tx.unwrap();

        host.start().await.unwrap();
        tx.send(event("1", LogLevel::Error)).await.unwrap();
        tx.send(event("2", LogLevel::Error)).await.unwrap();

        // 첫 번째 전송이 끝나기 전에는 두 번째 요청이 시작되지 않음
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(client.requests().len(), 1);

        drop(tx);
        host.join().await.unwrap();
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn join_without_start_returns_immediately() {
        let reactor = attached(Arc::new(MockIncidentClient::succeeding()));
        let (mut host, _tx) = ReactorHostBuilder::new(reactor).build().unwrap();
        host.join().await.unwrap();
        assert_eq!(host.state_name(), "initialized");
    }
}
