//! Pagerpost daemon library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `pagerpost-daemon` is used as a binary (main.rs).

pub mod clef;
pub mod cli;
pub mod logging;
pub mod metrics_server;
pub mod orchestrator;
pub mod source;
