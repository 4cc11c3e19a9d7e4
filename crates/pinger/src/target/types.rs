//! Target data types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::ConfigError;
use crate::{DEFAULT_LATENCY_BUDGET, DEFAULT_PERIOD};

/// Targets keyed by identity. Duplicate identities collapse on insert.
pub type TargetSet = BTreeMap<String, CheckTarget>;

/// What the scheduler does when a tick fires while an earlier run of the
/// same target is still in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Dispatch every tick; runs may overlap and report out of order
    #[default]
    Allow,
    /// Skip the tick while the previous guarded run is still in flight
    Skip,
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapPolicy::Allow => write!(f, "allow"),
            OverlapPolicy::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for OverlapPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(OverlapPolicy::Allow),
            "skip" => Ok(OverlapPolicy::Skip),
            other => Err(ConfigError::InvalidOverlapPolicy(other.to_string())),
        }
    }
}

/// One monitored endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTarget {
    /// Raw address or URL, both the check subject and the map key
    pub(crate) identity: String,

    /// Name taken from configuration, used for metric naming and logs
    pub(crate) label: String,

    /// Wall-clock budget for one complete pipeline run
    pub(crate) latency_budget: Duration,

    /// Interval between two check runs
    pub(crate) period: Duration,

    pub(crate) overlap: OverlapPolicy,
}

impl CheckTarget {
    /// Create a target with the default latency budget and period
    pub fn new(identity: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            label: label.into(),
            latency_budget: DEFAULT_LATENCY_BUDGET,
            period: DEFAULT_PERIOD,
            overlap: OverlapPolicy::default(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn latency_budget(&self) -> Duration {
        self.latency_budget
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn overlap(&self) -> OverlapPolicy {
        self.overlap
    }
}
