//! ## flowmgr-telemetry::metrics
//! **Prometheus export of resource pool occupancy**
//!
//! Gauges are labelled by adapter number and resource kind name.

use prometheus::{IntCounter, IntGaugeVec, Opts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub entries_in_use: IntGaugeVec,
    pub entries_capacity: IntGaugeVec,
    pub rejected_allocations: IntCounter,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let entries_in_use = IntGaugeVec::new(
            Opts::new("flowmgr_entries_in_use", "Allocated entries per resource pool"),
            &["adapter", "kind"],
        )?;
        let entries_capacity = IntGaugeVec::new(
            Opts::new("flowmgr_entries_capacity", "Total entries per resource pool"),
            &["adapter", "kind"],
        )?;
        let rejected_allocations = IntCounter::new(
            "flowmgr_rejected_allocations_total",
            "Allocations refused because a pool was exhausted",
        )?;

        registry.register(Box::new(entries_in_use.clone()))?;
        registry.register(Box::new(entries_capacity.clone()))?;
        registry.register(Box::new(rejected_allocations.clone()))?;

        Ok(Self {
            registry,
            entries_in_use,
            entries_capacity,
            rejected_allocations,
        })
    }

    /// Publishes one pool's occupancy.
    pub fn record_pool(&self, adapter_no: u8, kind: &str, in_use: usize, capacity: usize) {
        let adapter = adapter_no.to_string();
        let labels = [adapter.as_str(), kind];
        self.entries_in_use
            .with_label_values(&labels)
            .set(in_use as i64);
        self.entries_capacity
            .with_label_values(&labels)
            .set(capacity as i64);
    }

    pub fn add_rejected(&self, count: u64) {
        self.rejected_allocations.inc_by(count);
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
