//! 설정 관리 — pagerpost.toml 파싱 및 런타임 설정
//!
//! [`PagerpostConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PAGERPOST_PAGERDUTY_SERVICE_KEY=...` 형식)
//! 3. 설정 파일 (`pagerpost.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), pagerpost_core::error::PagerpostError> {
//! use pagerpost_core::config::PagerpostConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드 + 검증
//! let config = PagerpostConfig::load("pagerpost.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = PagerpostConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PagerpostError};
use crate::event::LogLevel;

/// Pagerpost 통합 설정
///
/// `pagerpost.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagerpostConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// PagerDuty 클라이언트 설정
    #[serde(default)]
    pub pagerduty: PagerDutyConfig,
    /// 리액터 설정 (호스트 설정 화면의 원시 입력값)
    #[serde(default)]
    pub reactor: ReactorSettings,
    /// 호스트 어댑터 설정
    #[serde(default)]
    pub host: HostConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl PagerpostConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용한 뒤 검증합니다.
    ///
    /// 서비스 키는 환경변수로만 주입되는 경우가 많으므로
    /// 검증은 오버라이드 이후에 수행합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PagerpostError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드, 검증 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PagerpostError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PagerpostError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PagerpostError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, PagerpostError> {
        toml::from_str(toml_str).map_err(|e| {
            PagerpostError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PAGERPOST_{SECTION}_{FIELD}`
    /// 예: `PAGERPOST_REACTOR_APPLICATION_NAME=checkout`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PAGERPOST_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "PAGERPOST_GENERAL_LOG_FORMAT");

        // PagerDuty
        override_string(
            &mut self.pagerduty.service_key,
            "PAGERPOST_PAGERDUTY_SERVICE_KEY",
        );
        override_string(
            &mut self.pagerduty.events_url,
            "PAGERPOST_PAGERDUTY_EVENTS_URL",
        );
        override_string(&mut self.pagerduty.severity, "PAGERPOST_PAGERDUTY_SEVERITY");
        override_parsed(
            &mut self.pagerduty.request_timeout_secs,
            "PAGERPOST_PAGERDUTY_REQUEST_TIMEOUT_SECS",
        );
        override_parsed(
            &mut self.pagerduty.max_retries,
            "PAGERPOST_PAGERDUTY_MAX_RETRIES",
        );
        override_parsed(
            &mut self.pagerduty.retry_delay_ms,
            "PAGERPOST_PAGERDUTY_RETRY_DELAY_MS",
        );
        override_string(
            &mut self.pagerduty.retry_backoff,
            "PAGERPOST_PAGERDUTY_RETRY_BACKOFF",
        );

        // Reactor
        override_opt_string(
            &mut self.reactor.application_name,
            "PAGERPOST_REACTOR_APPLICATION_NAME",
        );
        override_opt_string(
            &mut self.reactor.application_url,
            "PAGERPOST_REACTOR_APPLICATION_URL",
        );
        override_opt_string(
            &mut self.reactor.incident_id_property_name,
            "PAGERPOST_REACTOR_INCIDENT_ID_PROPERTY_NAME",
        );
        override_opt_string(
            &mut self.reactor.additional_properties,
            "PAGERPOST_REACTOR_ADDITIONAL_PROPERTIES",
        );

        // Host
        override_string(&mut self.host.input, "PAGERPOST_HOST_INPUT");
        override_string(&mut self.host.min_level, "PAGERPOST_HOST_MIN_LEVEL");
        override_parsed(
            &mut self.host.channel_capacity,
            "PAGERPOST_HOST_CHANNEL_CAPACITY",
        );

        // Metrics
        override_parsed(&mut self.metrics.enabled, "PAGERPOST_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "PAGERPOST_METRICS_LISTEN_ADDR",
        );
        override_parsed(&mut self.metrics.port, "PAGERPOST_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 리액터를 attach 하기 전에 호출되어 설정 오류를 걸러냅니다.
    pub fn validate(&self) -> Result<(), PagerpostError> {
        const MAX_RETRIES: u32 = 10;
        const MAX_RETRY_DELAY_MS: u64 = 60_000;
        const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;
        const MAX_CHANNEL_CAPACITY: usize = 1_000_000;

        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        // 서비스 키는 필수 (비밀값)
        if self.pagerduty.service_key.trim().is_empty() {
            return Err(invalid(
                "pagerduty.service_key",
                "service key must not be empty".to_owned(),
            ));
        }

        if !(self.pagerduty.events_url.starts_with("https://")
            || self.pagerduty.events_url.starts_with("http://"))
        {
            return Err(invalid(
                "pagerduty.events_url",
                "must be an http(s) URL".to_owned(),
            ));
        }

        let valid_severities = ["critical", "error", "warning", "info"];
        if !valid_severities.contains(&self.pagerduty.severity.as_str()) {
            return Err(invalid(
                "pagerduty.severity",
                format!("must be one of: {}", valid_severities.join(", ")),
            ));
        }

        if self.pagerduty.request_timeout_secs == 0
            || self.pagerduty.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS
        {
            return Err(invalid(
                "pagerduty.request_timeout_secs",
                format!("must be 1-{MAX_REQUEST_TIMEOUT_SECS}"),
            ));
        }

        if self.pagerduty.max_retries > MAX_RETRIES {
            return Err(invalid(
                "pagerduty.max_retries",
                format!("must be 0-{MAX_RETRIES}"),
            ));
        }

        if self.pagerduty.retry_delay_ms > MAX_RETRY_DELAY_MS {
            return Err(invalid(
                "pagerduty.retry_delay_ms",
                format!("must be 0-{MAX_RETRY_DELAY_MS}"),
            ));
        }

        let valid_backoffs = ["fixed", "exponential"];
        if !valid_backoffs.contains(&self.pagerduty.retry_backoff.as_str()) {
            return Err(invalid(
                "pagerduty.retry_backoff",
                format!("must be one of: {}", valid_backoffs.join(", ")),
            ));
        }

        if let Err(reason) = self.host.min_level.parse::<LogLevel>() {
            return Err(invalid("host.min_level", reason));
        }

        if self.host.input.is_empty() {
            return Err(invalid(
                "host.input",
                "must be a file path or '-' for stdin".to_owned(),
            ));
        }

        if self.host.channel_capacity == 0 || self.host.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(invalid(
                "host.channel_capacity",
                format!("must be 1-{MAX_CHANNEL_CAPACITY}"),
            ));
        }

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                return Err(invalid(
                    "metrics.port",
                    "must be non-zero when metrics are enabled".to_owned(),
                ));
            }
            if self.metrics.endpoint != "/metrics" {
                return Err(invalid(
                    "metrics.endpoint",
                    "only '/metrics' is currently supported".to_owned(),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> PagerpostError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

// Default는 derive 매크로로 자동 생성 (각 필드가 Default를 구현하므로)

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// PagerDuty Events API 설정
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerDutyConfig {
    /// 통합 서비스 키 (Events API v2 routing key, 비밀값)
    pub service_key: String,
    /// Events API 엔드포인트
    pub events_url: String,
    /// 인시던트 심각도 (critical, error, warning, info)
    pub severity: String,
    /// 요청당 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 최초 시도 이후 재시도 횟수
    pub max_retries: u32,
    /// 재시도 간격 (밀리초)
    pub retry_delay_ms: u64,
    /// 재시도 간격 증가 방식 (fixed, exponential)
    pub retry_backoff: String,
}

impl Default for PagerDutyConfig {
    fn default() -> Self {
        Self {
            service_key: String::new(),
            events_url: "https://events.pagerduty.com/v2/enqueue".to_owned(),
            severity: "error".to_owned(),
            request_timeout_secs: 10,
            max_retries: 1,
            retry_delay_ms: 1000,
            retry_backoff: "fixed".to_owned(),
        }
    }
}

// 서비스 키가 로그에 찍히지 않도록 Debug를 직접 구현
impl fmt::Debug for PagerDutyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerDutyConfig")
            .field("service_key", &"<redacted>")
            .field("events_url", &self.events_url)
            .field("severity", &self.severity)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("retry_backoff", &self.retry_backoff)
            .finish()
    }
}

/// 리액터 원시 설정
///
/// 호스트 설정 화면에서 입력한 자유 텍스트 그대로입니다.
/// 값이 없는 것과 빈 문자열을 구분하기 위해 `Option`을 사용합니다.
/// 검증된 형태로의 변환은 `pagerpost-reactor`의 `ReactorConfig`가 담당합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactorSettings {
    /// 인시던트를 만들 때 사용할 애플리케이션 이름
    pub application_name: Option<String>,
    /// 인시던트에 표시할 애플리케이션 URL
    pub application_url: Option<String>,
    /// 중복 제거 키로 쓸 이벤트 속성 이름
    pub incident_id_property_name: Option<String>,
    /// 페이로드에 복사할 추가 속성 이름 (한 줄에 하나)
    pub additional_properties: Option<String>,
}

/// 호스트 어댑터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// 이벤트 입력 경로 (`-`는 stdin)
    pub input: String,
    /// 리액터에 전달할 최소 로그 레벨
    pub min_level: String,
    /// 호스트 -> 리액터 채널 용량
    pub channel_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            input: "-".to_owned(),
            min_level: "error".to_owned(),
            channel_capacity: 256,
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9184,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = Some(val);
    }
}

fn override_parsed<T: FromStr>(target: &mut T, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                expected = std::any::type_name::<T>(),
                "failed to parse env var, ignoring"
            ),
        }
    }
}
