//! Test doubles shared by the unit tests in this crate.

use std::sync::Mutex;
use std::time::Duration;

use pagerpost_pagerduty::{DeliveryResult, IncidentClient, IncidentRequest};

/// Incident client that records every request and returns a fixed result.
pub struct MockIncidentClient {
    result: DeliveryResult,
    delay: Duration,
    requests: Mutex<Vec<IncidentRequest>>,
}

impl MockIncidentClient {
    pub fn returning(result: DeliveryResult) -> Self {
        Self {
            result,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::returning(DeliveryResult::success("Event processed"))
    }

    /// Makes every call sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<IncidentRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl IncidentClient for MockIncidentClient {
    async fn trigger(&self, request: &IncidentRequest) -> DeliveryResult {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}
