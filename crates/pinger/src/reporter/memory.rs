use std::collections::HashMap;

use parking_lot::Mutex;

use super::Reporter;

/// Keeps the latest status per `(label, address)`, last write wins
#[derive(Debug, Default)]
pub struct MemoryReporter {
    latest: Mutex<HashMap<(String, String), String>>,
    records: Mutex<usize>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest status recorded for the pair
    pub fn status(&self, label: &str, address: &str) -> Option<String> {
        self.latest.lock().get(&(label.to_string(), address.to_string())).cloned()
    }

    /// Number of `record` calls so far
    pub fn record_count(&self) -> usize {
        *self.records.lock()
    }
}

impl Reporter for MemoryReporter {
    fn record(&self, label: &str, address: &str, status: &str) {
        self.latest.lock().insert((label.to_string(), address.to_string()), status.to_string());
        *self.records.lock() += 1;
    }
}
