//! ## flowmgr-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Later calls are no-ops.
    pub fn init(default_level: &str) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        let _ = fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
    }

    /// Records a device lifecycle or audit event.
    #[inline]
    pub fn log_event(event_type: &str, adapter_no: u8, detail: &str) {
        let span = tracing::info_span!("device_event", event_type, adapter = adapter_no);
        let _guard = span.enter();
        tracing::info!(detail, "Device event occurred");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_logging() {
        EventLogger::log_event("create", 3, "adapter probed");
        assert!(logs_contain("Device event occurred"));
        assert!(logs_contain("adapter probed"));
    }
}
