//! Pinger - periodic availability checks for configured endpoints
//!
//! Every configured target gets its own scheduler which runs a cascade of
//! checks (DNS, HTTP reachability, TLS certificate validity) under a hard
//! deadline and hands the classified outcome to a reporter.

pub mod config;
pub mod monitoring;
pub mod reporter;
pub mod shutdown;
pub mod target;

// Re-export main types
pub use config::{ConfigError, ConfigSource, ProcessEnv, load_targets, parse_targets};
pub use monitoring::{FailureKind, MonitoringScheduler, Outcome, Probe, VerificationPipeline};
pub use reporter::{MemoryReporter, PrometheusReporter, Reporter};
pub use shutdown::ShutdownController;
pub use target::{CheckTarget, OverlapPolicy, TargetSet};

/// Latency budget applied when a target does not override it
pub const DEFAULT_LATENCY_BUDGET: std::time::Duration = std::time::Duration::from_secs(1);

/// Check period applied when a target does not override it
pub const DEFAULT_PERIOD: std::time::Duration = std::time::Duration::from_secs(10);
