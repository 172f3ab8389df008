//! Prometheus metrics for the template registry.
//!
//! - Operation counters by outcome (`ok` or the error kind)
//! - Operation latency
//! - Number of stored templates, tracked by registry writes and reset by list and health checks

use std::time::Instant;

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, HistogramVec,
    IntCounterVec, IntGauge, TextEncoder,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "registry";

lazy_static! {
    /// Template operations by operation name and outcome
    pub static ref TEMPLATE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_operations_total", METRIC_PREFIX),
        "Total template operations",
        &["operation", "outcome"]
    ).unwrap();

    /// Template operation latency in seconds
    pub static ref TEMPLATE_OPERATION_DURATION: HistogramVec = register_histogram_vec!(
        format!("{}_template_operation_duration_seconds", METRIC_PREFIX),
        "Template operation latency",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    ).unwrap();

    /// Templates currently held by the persistence service
    pub static ref TEMPLATES_STORED: IntGauge = register_int_gauge!(
        format!("{}_templates_stored", METRIC_PREFIX),
        "Number of stored templates"
    ).unwrap();
}

/// Records the outcome and latency of one registry operation
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Finish the timer with `ok` or an error kind as outcome
    pub fn finish(self, outcome: &str) {
        TEMPLATE_OPERATION_DURATION
            .with_label_values(&[self.operation])
            .observe(self.start.elapsed().as_secs_f64());
        TEMPLATE_OPERATIONS_TOTAL
            .with_label_values(&[self.operation, outcome])
            .inc();
    }
}

/// Encode all registered metrics in the Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
