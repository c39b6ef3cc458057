//! Incident client abstraction.
//!
//! The reactor only needs one capability from the alerting service: trigger an
//! incident and report whether it worked. [`IncidentClient`] captures that so the
//! reactor can be driven by [`PagerDutyClient`](crate::PagerDutyClient) in
//! production and by an in-memory recorder in tests.

use std::future::Future;
use std::sync::Arc;

use crate::types::{DeliveryResult, IncidentRequest};

/// Capability to create or update an incident in an on-call service.
///
/// Implementations own their retry behaviour. A call always resolves to a
/// [`DeliveryResult`]; transport and service errors are folded into
/// `success = false` with a readable message rather than returned as `Err`.
pub trait IncidentClient: Send + Sync + 'static {
    /// Triggers an incident for `request`.
    fn trigger(&self, request: &IncidentRequest) -> impl Future<Output = DeliveryResult> + Send;
}

impl<C: IncidentClient> IncidentClient for Arc<C> {
    fn trigger(&self, request: &IncidentRequest) -> impl Future<Output = DeliveryResult> + Send {
        self.as_ref().trigger(request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recorder {
        seen: Mutex<Vec<IncidentRequest>>,
    }

    impl IncidentClient for Recorder {
        async fn trigger(&self, request: &IncidentRequest) -> DeliveryResult {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(request.clone());
            }
            DeliveryResult::success("recorded")
        }
    }

    #[tokio::test]
    async fn arc_wrapped_client_forwards_calls() {
        let inner = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let shared: Arc<Recorder> = Arc::clone(&inner);

        let request = IncidentRequest {
            message: "disk full".to_owned(),
            ..IncidentRequest::default()
        };
        let result = IncidentClient::trigger(&shared, &request).await;

        assert!(result.success);
        let seen = inner.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].message, "disk full");
    }
}
