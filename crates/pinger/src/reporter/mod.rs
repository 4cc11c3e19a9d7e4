//! Outcome reporting.
//!
//! Reporters receive `(label, address, status)` for every finished check run
//! and fold it into exported state. They are shared by all schedulers and
//! must accept concurrent writes.

mod memory;
mod exporter;

pub use memory::MemoryReporter;
pub use exporter::{PrometheusReporter, ReporterError, metric_name};

/// Sink for check outcomes
pub trait Reporter: Send + Sync {
    /// Record the status just observed for `address`
    fn record(&self, label: &str, address: &str, status: &str);
}
