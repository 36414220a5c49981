//! # flowmgr telemetry
//!
//! Logging set-up and prometheus export of pool occupancy.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
