//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `pagerpost_`
//! - 모듈명: `reactor_`, `pagerduty_`, `host_`, `source_`, `daemon_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(pagerpost_core::metrics::REACTOR_EVENTS_HANDLED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 로그 레벨 레이블 키
pub const LABEL_LEVEL: &str = "level";

// ─── Reactor 메트릭 ─────────────────────────────────────────────────

/// Reactor: 처리된 이벤트 수 (counter)
pub const REACTOR_EVENTS_HANDLED_TOTAL: &str = "pagerpost_reactor_events_handled_total";

/// Reactor: attach 전에 도착해 무시된 이벤트 수 (counter)
pub const REACTOR_EVENTS_DETACHED_TOTAL: &str = "pagerpost_reactor_events_detached_total";

/// Reactor: 인시던트 전송 결과 수 (counter, label: result)
pub const REACTOR_DELIVERIES_TOTAL: &str = "pagerpost_reactor_deliveries_total";

/// Reactor: 인시던트 전송 소요 시간 (histogram, 초)
pub const REACTOR_DELIVERY_DURATION_SECONDS: &str = "pagerpost_reactor_delivery_duration_seconds";

// ─── PagerDuty 클라이언트 메트릭 ────────────────────────────────────

/// PagerDuty: 보낸 HTTP 요청 수 (counter, label: result)
pub const PAGERDUTY_REQUESTS_TOTAL: &str = "pagerpost_pagerduty_requests_total";

/// PagerDuty: 재시도 횟수 (counter)
pub const PAGERDUTY_RETRIES_TOTAL: &str = "pagerpost_pagerduty_retries_total";

// ─── Host 메트릭 ────────────────────────────────────────────────────

/// Host: 채널로 수신한 이벤트 수 (counter, label: level)
pub const HOST_EVENTS_RECEIVED_TOTAL: &str = "pagerpost_host_events_received_total";

/// Host: 최소 레벨 미달로 걸러진 이벤트 수 (counter)
pub const HOST_EVENTS_FILTERED_TOTAL: &str = "pagerpost_host_events_filtered_total";

// ─── Source 메트릭 ──────────────────────────────────────────────────

/// Source: 읽은 입력 라인 수 (counter)
pub const SOURCE_LINES_READ_TOTAL: &str = "pagerpost_source_lines_read_total";

/// Source: 파싱 실패 수 (counter)
pub const SOURCE_PARSE_ERRORS_TOTAL: &str = "pagerpost_source_parse_errors_total";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "pagerpost_daemon_build_info";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 인시던트 전송 지연 시간 히스토그램 버킷 (초)
///
/// 10ms ~ 30s 범위 (재시도 지연 포함)
pub const DELIVERY_DURATION_BUCKETS: [f64; 9] = [0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 10.0, 30.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `pagerpost-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Reactor
    describe_counter!(
        REACTOR_EVENTS_HANDLED_TOTAL,
        "Total number of events handed to the reactor while attached"
    );
    describe_counter!(
        REACTOR_EVENTS_DETACHED_TOTAL,
        "Total number of events ignored because the reactor was not attached"
    );
    describe_counter!(
        REACTOR_DELIVERIES_TOTAL,
        "Incident deliveries by result (success, failure)"
    );
    describe_histogram!(
        REACTOR_DELIVERY_DURATION_SECONDS,
        "Time spent in a single incident trigger call, retries included"
    );

    // PagerDuty
    describe_counter!(
        PAGERDUTY_REQUESTS_TOTAL,
        "HTTP requests sent to the PagerDuty Events API by result"
    );
    describe_counter!(
        PAGERDUTY_RETRIES_TOTAL,
        "Total number of retried PagerDuty requests"
    );

    // Host
    describe_counter!(
        HOST_EVENTS_RECEIVED_TOTAL,
        "Events received by the host adapter by level"
    );
    describe_counter!(
        HOST_EVENTS_FILTERED_TOTAL,
        "Events dropped by the host adapter's minimum level filter"
    );

    // Source
    describe_counter!(SOURCE_LINES_READ_TOTAL, "Input lines read by the event source");
    describe_counter!(
        SOURCE_PARSE_ERRORS_TOTAL,
        "Input lines that could not be parsed as events"
    );

    // Daemon
    describe_gauge!(DAEMON_BUILD_INFO, "Build information (always 1, with version label)");
}
