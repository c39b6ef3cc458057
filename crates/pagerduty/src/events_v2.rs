//! PagerDuty Events API v2 client.
//!
//! [`PagerDutyClient`] turns an [`IncidentRequest`] into a `trigger` event and
//! posts it to the Events API. Failed attempts are retried according to the
//! configured [`RetryPolicy`]; only transient failures (throttling, server
//! errors, transport errors, timeouts) are retried.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "routing_key": "<service key>",
//!   "event_action": "trigger",
//!   "dedup_key": "abc123",
//!   "payload": {
//!     "summary": "Disk full on db-01",
//!     "source": "Seq",
//!     "severity": "error",
//!     "custom_details": { "foo": "bar" }
//!   },
//!   "client": "Seq",
//!   "client_url": "https://seq.example.com"
//! }
//! ```
//!
//! # Examples
//!
//! ```ignore
//! use pagerpost_pagerduty::{ClientInfo, PagerDutyClient, RetryPolicy};
//!
//! let client = PagerDutyClient::builder("routing-key", ClientInfo::new("Seq", ""))
//!     .retry_policy(RetryPolicy::conservative())
//!     .build()?;
//! # Ok::<(), pagerpost_pagerduty::PagerDutyError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pagerpost_core::config::PagerDutyConfig;
use pagerpost_core::metrics as m;

use crate::client::IncidentClient;
use crate::error::PagerDutyError;
use crate::retry::RetryPolicy;
use crate::types::{ClientInfo, DeliveryResult, IncidentRequest};

/// Default Events API v2 endpoint.
pub const DEFAULT_EVENTS_URL: &str = "https://events.pagerduty.com/v2/enqueue";

/// Maximum summary length accepted by the Events API.
pub const MAX_SUMMARY_CHARS: usize = 1024;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Incident severity as understood by the Events API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    #[default]
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

impl FromStr for Severity {
    type Err = PagerDutyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Self::Critical),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            other => Err(PagerDutyError::Config {
                field: "pagerduty.severity".to_owned(),
                reason: format!("unknown severity '{other}'"),
            }),
        }
    }
}

/// Request body for `POST /v2/enqueue`.
#[derive(Debug, Serialize)]
struct EnqueueRequest<'a> {
    routing_key: &'a str,
    event_action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dedup_key: Option<&'a str>,
    payload: EnqueuePayload<'a>,
    client: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    client_url: &'a str,
}

#[derive(Debug, Serialize)]
struct EnqueuePayload<'a> {
    summary: &'a str,
    source: &'a str,
    severity: Severity,
    custom_details: &'a BTreeMap<String, String>,
}

/// Response body of the Events API (both success and error).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnqueueResponse {
    status: String,
    message: String,
    errors: Vec<String>,
}

impl EnqueueResponse {
    fn describe(&self) -> String {
        let mut text = if self.message.is_empty() {
            self.status.clone()
        } else {
            self.message.clone()
        };
        if !self.errors.is_empty() {
            if !text.is_empty() {
                text.push_str(": ");
            }
            text.push_str(&self.errors.join("; "));
        }
        text
    }
}

/// Truncates `text` to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// PagerDuty Events API v2 incident client.
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools
/// connections across calls.
pub struct PagerDutyClient {
    http: reqwest::Client,
    events_url: String,
    routing_key: String,
    client_info: ClientInfo,
    severity: Severity,
    retry: RetryPolicy,
}

impl PagerDutyClient {
    /// Starts building a client for the given integration key and caller identity.
    pub fn builder(
        routing_key: impl Into<String>,
        client_info: ClientInfo,
    ) -> PagerDutyClientBuilder {
        PagerDutyClientBuilder::new(routing_key, client_info)
    }

    /// Builds a client from the `[pagerduty]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns `PagerDutyError::Config` for an unknown severity or backoff, and
    /// `PagerDutyError::Build` if the HTTP client cannot be created.
    pub fn from_config(
        config: &PagerDutyConfig,
        client_info: ClientInfo,
    ) -> Result<Self, PagerDutyError> {
        Self::builder(config.service_key.clone(), client_info)
            .events_url(config.events_url.clone())
            .severity(config.severity.parse()?)
            .request_timeout(Duration::from_secs(config.request_timeout_secs))
            .retry_policy(RetryPolicy::from_config(config)?)
            .build()
    }

    /// Returns the caller identity sent with every event.
    pub fn client_info(&self) -> &ClientInfo {
        &self.client_info
    }

    /// Returns the retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn enqueue_request<'a>(&'a self, request: &'a IncidentRequest) -> EnqueueRequest<'a> {
        EnqueueRequest {
            routing_key: &self.routing_key,
            event_action: "trigger",
            dedup_key: request.dedup_key.as_deref(),
            payload: EnqueuePayload {
                summary: truncate_chars(&request.message, MAX_SUMMARY_CHARS),
                source: &self.client_info.name,
                severity: self.severity,
                custom_details: &request.payload,
            },
            client: &self.client_info.name,
            client_url: &self.client_info.url,
        }
    }

    /// Sends one request without retrying.
    async fn send_once(&self, body: &EnqueueRequest<'_>) -> Result<String, PagerDutyError> {
        let response = self.http.post(&self.events_url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let parsed: EnqueueResponse = serde_json::from_str(&text).unwrap_or_default();

        if status.is_success() {
            let message = parsed.describe();
            Ok(if message.is_empty() {
                "Event processed".to_owned()
            } else {
                message
            })
        } else {
            let mut message = parsed.describe();
            if message.is_empty() {
                message = truncate_chars(text.trim(), 200).to_owned();
            }
            Err(PagerDutyError::Http {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn trigger_with_retry(&self, request: &IncidentRequest) -> DeliveryResult {
        let body = self.enqueue_request(request);
        let mut last_error = None;

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                let delay = self.retry.delay_for(attempt);
                counter!(m::PAGERDUTY_RETRIES_TOTAL).increment(1);
                warn!(
                    attempt = attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %last_error.as_ref().map(ToString::to_string).unwrap_or_default(),
                    "retrying pagerduty trigger"
                );
                tokio::time::sleep(delay).await;
            }

            let started = Instant::now();
            match self.send_once(&body).await {
                Ok(message) => {
                    counter!(m::PAGERDUTY_REQUESTS_TOTAL, m::LABEL_RESULT => "success")
                        .increment(1);
                    debug!(
                        attempt = attempt,
                        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "pagerduty accepted event"
                    );
                    return DeliveryResult::success(message);
                }
                Err(e) => {
                    counter!(m::PAGERDUTY_REQUESTS_TOTAL, m::LABEL_RESULT => "failure")
                        .increment(1);
                    let retryable = e.is_retryable();
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        DeliveryResult::failure(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no delivery attempt was made".to_owned()),
        )
    }
}

impl fmt::Debug for PagerDutyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerDutyClient")
            .field("events_url", &self.events_url)
            .field("routing_key", &"<redacted>")
            .field("client_info", &self.client_info)
            .field("severity", &self.severity)
            .field("retry", &self.retry)
            .finish()
    }
}

impl IncidentClient for PagerDutyClient {
    async fn trigger(&self, request: &IncidentRequest) -> DeliveryResult {
        self.trigger_with_retry(request).await
    }
}

/// Builder for [`PagerDutyClient`].
pub struct PagerDutyClientBuilder {
    routing_key: String,
    client_info: ClientInfo,
    events_url: String,
    severity: Severity,
    request_timeout: Duration,
    retry: RetryPolicy,
}

impl PagerDutyClientBuilder {
    /// Creates a builder with the Events API defaults.
    pub fn new(routing_key: impl Into<String>, client_info: ClientInfo) -> Self {
        Self {
            routing_key: routing_key.into(),
            client_info,
            events_url: DEFAULT_EVENTS_URL.to_owned(),
            severity: Severity::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::conservative(),
        }
    }

    /// Overrides the endpoint (used by tests and proxies).
    pub fn events_url(mut self, url: impl Into<String>) -> Self {
        self.events_url = url.into();
        self
    }

    /// Sets the incident severity.
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Validates the settings and builds the client.
    pub fn build(self) -> Result<PagerDutyClient, PagerDutyError> {
        if self.routing_key.trim().is_empty() {
            return Err(PagerDutyError::Config {
                field: "pagerduty.service_key".to_owned(),
                reason: "service key must not be empty".to_owned(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(PagerDutyError::Config {
                field: "pagerduty.request_timeout_secs".to_owned(),
                reason: "must be greater than zero".to_owned(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(concat!("pagerpost/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PagerDutyError::Build(e.to_string()))?;

        Ok(PagerDutyClient {
            http,
            events_url: self.events_url,
            routing_key: self.routing_key,
            client_info: self.client_info,
            severity: self.severity,
            retry: self.retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PagerDutyClient {
        PagerDutyClient::builder("R0UT1NG", ClientInfo::new("Seq", "https://seq.local"))
            .build()
            .unwrap()
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("가나다라", 2), "가나");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn enqueue_body_shape() {
        let client = client();
        let request = IncidentRequest {
            message: "Disk full".to_owned(),
            payload: BTreeMap::from([("foo".to_owned(), "bar".to_owned())]),
            dedup_key: Some("abc123".to_owned()),
        };
        let body = serde_json::to_value(client.enqueue_request(&request)).unwrap();

        assert_eq!(body["routing_key"], "R0UT1NG");
        assert_eq!(body["event_action"], "trigger");
        assert_eq!(body["dedup_key"], "abc123");
        assert_eq!(body["payload"]["summary"], "Disk full");
        assert_eq!(body["payload"]["source"], "Seq");
        assert_eq!(body["payload"]["severity"], "error");
        assert_eq!(body["payload"]["custom_details"]["foo"], "bar");
        assert_eq!(body["client"], "Seq");
        assert_eq!(body["client_url"], "https://seq.local");
    }

    #[test]
    fn enqueue_body_omits_absent_dedup_key_and_url() {
        let client = PagerDutyClient::builder("k", ClientInfo::new("Seq", ""))
            .build()
            .unwrap();
        let request = IncidentRequest {
            message: "boom".to_owned(),
            ..IncidentRequest::default()
        };
        let body = serde_json::to_value(client.enqueue_request(&request)).unwrap();

        assert!(body.get("dedup_key").is_none());
        assert!(body.get("client_url").is_none());
        assert_eq!(body["payload"]["custom_details"], serde_json::json!({}));
    }

    #[test]
    fn long_summary_is_truncated() {
        let client = client();
        let request = IncidentRequest {
            message: "x".repeat(MAX_SUMMARY_CHARS + 50),
            ..IncidentRequest::default()
        };
        let body = client.enqueue_request(&request);
        assert_eq!(body.payload.summary.chars().count(), MAX_SUMMARY_CHARS);
    }

    #[test]
    fn severity_parse_and_display() {
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn builder_rejects_empty_key() {
        let err = PagerDutyClient::builder("  ", ClientInfo::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, PagerDutyError::Config { .. }));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = PagerDutyClient::builder("k", ClientInfo::default())
            .request_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, PagerDutyError::Config { .. }));
    }

    #[test]
    fn from_config_applies_section() {
        let config = PagerDutyConfig {
            service_key: "k".to_owned(),
            severity: "critical".to_owned(),
            max_retries: 3,
            ..PagerDutyConfig::default()
        };
        let client = PagerDutyClient::from_config(&config, ClientInfo::new("app", "")).unwrap();
        assert_eq!(client.severity, Severity::Critical);
        assert_eq!(client.retry_policy().max_retries, 3);
        assert_eq!(client.client_info().name, "app");
        assert_eq!(client.events_url, DEFAULT_EVENTS_URL);
    }

    #[test]
    fn debug_redacts_routing_key() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("R0UT1NG"));
    }

    #[test]
    fn response_description_prefers_message_and_appends_errors() {
        let resp = EnqueueResponse {
            status: "invalid event".to_owned(),
            message: "Event object is invalid".to_owned(),
            errors: vec!["'routing_key' is invalid".to_owned()],
        };
        assert_eq!(
            resp.describe(),
            "Event object is invalid: 'routing_key' is invalid"
        );
        assert_eq!(EnqueueResponse::default().describe(), "");
    }
}
