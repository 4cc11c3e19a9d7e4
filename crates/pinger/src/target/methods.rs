//! Builder-style methods for check targets.
//!
//! Durations set here are not validated. Configuration parsing rejects zero
//! values, and the scheduler runs a zero-period target at the default period.

use std::time::Duration;

use super::types::{CheckTarget, OverlapPolicy};

impl CheckTarget {
    /// Set the latency budget for one pipeline run
    pub fn with_latency_budget(mut self, budget: Duration) -> Self {
        self.latency_budget = budget;
        self
    }

    /// Set the interval between check runs
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Set the run-overlap policy
    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    /// Set the label used for metrics and logs
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}
