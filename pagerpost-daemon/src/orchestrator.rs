//! Daemon assembly and lifecycle.
//!
//! The [`Orchestrator`] turns a validated [`PagerpostConfig`] into a running
//! forwarder:
//!
//! ```text
//! CLEF input --source::pump--> mpsc --> ReactorHost --> Reactor --> PagerDuty
//! ```
//!
//! # Shutdown
//!
//! On EOF the source drops its sender and the host drains what is already
//! queued. On SIGINT/SIGTERM the source is cancelled first and the host
//! drains the same way, so no accepted event is lost.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use pagerpost_core::config::PagerpostConfig;
use pagerpost_core::event::{LogEvent, LogLevel};
use pagerpost_core::pipeline::{HealthStatus, Pipeline};
use pagerpost_pagerduty::PagerDutyClient;
use pagerpost_reactor::{HostStats, Reactor, ReactorConfig, ReactorHost, ReactorHostBuilder};

use crate::metrics_server;
use crate::source::{self, SourceStats};

/// What one run processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Input side counters. Zero when the run was interrupted.
    pub source: SourceStats,
    /// Host side counters after draining.
    pub host: HostStats,
    /// True when a shutdown signal ended the run before EOF.
    pub interrupted: bool,
}

/// The main daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: PagerpostConfig,
    /// Host that owns the attached reactor.
    host: ReactorHost<PagerDutyClient>,
    /// Sender half handed to the source on `run`.
    event_tx: Option<mpsc::Sender<LogEvent>>,
    /// Build time, for uptime reporting.
    start_time: Instant,
}

impl Orchestrator {
    /// Load configuration from `config_path` and build the orchestrator.
    ///
    /// Environment overrides are applied before validation.
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = PagerpostConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config)
    }

    /// Build the orchestrator from an already-loaded configuration.
    ///
    /// Installs the metrics recorder when enabled, builds the PagerDuty
    /// client, attaches the reactor and prepares the host. Nothing runs
    /// until [`run`](Self::run).
    pub fn build_from_config(config: PagerpostConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        let reactor_config = ReactorConfig::from_settings(&config.reactor);
        let client = PagerDutyClient::from_config(&config.pagerduty, reactor_config.client_info())
            .map_err(|e| anyhow::anyhow!("failed to build PagerDuty client: {}", e))?;

        let mut reactor = Reactor::new();
        reactor
            .attach(reactor_config, Arc::new(client))
            .map_err(|e| anyhow::anyhow!("failed to attach reactor: {}", e))?;

        let min_level: LogLevel = config
            .host
            .min_level
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid host.min_level: {}", e))?;

        let (host, event_tx) = ReactorHostBuilder::new(Arc::new(reactor))
            .min_level(min_level)
            .channel_capacity(config.host.channel_capacity)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build reactor host: {}", e))?;

        Ok(Self {
            config,
            host,
            event_tx,
            start_time: Instant::now(),
        })
    }

    /// Run until the input is exhausted or SIGINT/SIGTERM arrives.
    pub async fn run(&mut self) -> Result<RunSummary> {
        self.run_until(wait_for_shutdown_signal()).await
    }

    /// Run until the input is exhausted or `shutdown` resolves.
    ///
    /// `shutdown` yields the name of the signal that ended the run.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = Result<&'static str>>,
    {
        let event_tx = self
            .event_tx
            .take()
            .ok_or_else(|| anyhow::anyhow!("orchestrator has already run"))?;
        let reader = source::open_input(&self.config.host.input).await?;

        self.host
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start reactor host: {}", e))?;
        info!(
            input = %self.config.host.input,
            min_level = %self.host.min_level(),
            "pagerpost running"
        );

        let mut pump = tokio::spawn(async move { source::pump(reader, &event_tx).await });

        let outcome: Result<(SourceStats, bool)> = tokio::select! {
            joined = &mut pump => joined
                .map_err(|e| anyhow::anyhow!("input task failed: {}", e))
                .and_then(|stats| stats)
                .map(|stats| (stats, false)),
            signal = shutdown => {
                pump.abort();
                // cancelled; the sender is dropped with the task
                let _ = pump.await;
                signal.map(|signal| {
                    info!(signal, "shutdown signal received, draining queued events");
                    (SourceStats::default(), true)
                })
            }
        };

        // queued events are delivered even when the input failed
        self.host
            .join()
            .await
            .map_err(|e| anyhow::anyhow!("reactor host failed: {}", e))?;
        let (source, interrupted) = outcome?;

        let summary = RunSummary {
            source,
            host: self.host.stats(),
            interrupted,
        };
        if summary.host.failed > 0 {
            warn!(
                failed = summary.host.failed,
                "some events could not be delivered to PagerDuty"
            );
        }
        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            lines = summary.source.lines,
            skipped = summary.source.skipped,
            delivered = summary.host.delivered,
            failed = summary.host.failed,
            "pagerpost stopped"
        );
        Ok(summary)
    }

    /// Current health of the reactor host.
    pub async fn health(&self) -> HealthStatus {
        self.host.health_check().await
    }

    /// The configuration this orchestrator was built from.
    pub fn config(&self) -> &PagerpostConfig {
        &self.config
    }
}

/// Wait for SIGTERM or SIGINT.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("failed to listen for Ctrl-C: {}", e))?;
    Ok("Ctrl-C")
}
