//! Shared helpers for the reactor integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use pagerpost_pagerduty::{DeliveryResult, IncidentClient, IncidentRequest};

/// Incident client that records requests and answers with a fixed result.
pub struct RecordingClient {
    result: DeliveryResult,
    requests: Mutex<Vec<IncidentRequest>>,
}

impl RecordingClient {
    pub fn new(result: DeliveryResult) -> Self {
        Self {
            result,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn ok() -> Self {
        Self::new(DeliveryResult::success("Event processed"))
    }

    pub fn requests(&self) -> Vec<IncidentRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl IncidentClient for RecordingClient {
    async fn trigger(&self, request: &IncidentRequest) -> DeliveryResult {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.result.clone()
    }
}

/// One captured log record.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl Record {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// `tracing` layer that keeps every event in memory.
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<Record>>>,
}

impl LogCapture {
    /// Installs the capture as the thread's default subscriber.
    ///
    /// Works with `#[tokio::test]`'s current-thread runtime.
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn at_level(&self, level: Level) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);
        if let Ok(mut records) = self.records.lock() {
            records.push(Record {
                level: *event.metadata().level(),
                fields: visitor.0,
            });
        }
    }
}

#[derive(Default)]
struct FieldCollector(HashMap<String, String>);

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}
