use std::collections::HashMap;

use prometheus::{GaugeVec, Opts, Registry};
use thiserror::Error;
use tracing::warn;

use super::Reporter;
use crate::target::CheckTarget;

const METRIC_SUFFIX: &str = "_availability";

#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("failed to register metric {name}: {source}")]
    Registration {
        name: String,
        #[source]
        source: prometheus::Error,
    },
}

/// Metric name for a target label: lower-cased, anything outside
/// `[a-z0-9_]` replaced by `_`, suffixed with `_availability`
pub fn metric_name(label: &str) -> String {
    let mut name: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }

    name.push_str(METRIC_SUFFIX);
    name
}

/// Reporter exposing one gauge per target, labeled by address and status.
///
/// The observed `(address, status)` combination is set to 1. Combinations
/// seen earlier are left as they are.
pub struct PrometheusReporter {
    gauges: HashMap<String, GaugeVec>,
}

impl PrometheusReporter {
    /// Register a gauge for every target into `registry`. Targets whose
    /// labels map to the same metric name share one gauge.
    pub fn register<'a>(
        registry: &Registry,
        targets: impl IntoIterator<Item = &'a CheckTarget>,
    ) -> Result<Self, ReporterError> {
        let mut gauges = HashMap::new();

        for target in targets {
            let name = metric_name(target.label());
            if gauges.contains_key(&name) {
                continue;
            }

            let registration_error =
                |source| ReporterError::Registration { name: name.clone(), source };

            let opts = Opts::new(name.clone(), format!("Availability of {} by address and status", target.label()));
            let gauge = GaugeVec::new(opts, &["address", "status"]).map_err(registration_error)?;
            registry.register(Box::new(gauge.clone())).map_err(registration_error)?;

            gauges.insert(name, gauge);
        }

        Ok(Self { gauges })
    }
}

impl Reporter for PrometheusReporter {
    fn record(&self, label: &str, address: &str, status: &str) {
        match self.gauges.get(&metric_name(label)) {
            Some(gauge) => gauge.with_label_values(&[address, status]).set(1.0),
            None => warn!(label, address, status, "no metric registered for label"),
        }
    }
}
