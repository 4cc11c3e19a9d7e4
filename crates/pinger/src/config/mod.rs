//! Target configuration.
//!
//! Targets are declared through flat key/value pairs:
//!
//! ```text
//! HOST_EXAMPLE=https://example.com
//! LATENCY_EXAMPLE=2s
//! PERIOD_EXAMPLE=1m
//! OVERLAP_EXAMPLE=skip
//! ```
//!
//! [`parse_targets`] is a pure function over those pairs; where they come
//! from is up to the [`ConfigSource`].

mod duration;
mod error;

use std::time::Duration;

use tracing::info;

pub use duration::parse_duration;
pub use error::ConfigError;

use crate::target::{CheckTarget, OverlapPolicy, TargetSet};

/// Declares a target, the remainder of the key is its label
pub const HOST_PREFIX: &str = "HOST_";
/// Overrides the latency budget of the target with the same label
pub const LATENCY_PREFIX: &str = "LATENCY_";
/// Overrides the check period of the target with the same label
pub const PERIOD_PREFIX: &str = "PERIOD_";
/// Selects the overlap policy of the target with the same label
pub const OVERLAP_PREFIX: &str = "OVERLAP_";

/// Somewhere key/value pairs can be read from
pub trait ConfigSource {
    /// All pairs in source order
    fn pairs(&self) -> Vec<(String, String)>;
}

/// The process environment. Variables that are not valid unicode are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn pairs(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }
}

impl ConfigSource for Vec<(String, String)> {
    fn pairs(&self) -> Vec<(String, String)> {
        self.clone()
    }
}

/// Read every pair from `source`, build the targets and log what is watched
pub fn load_targets(source: &impl ConfigSource) -> Result<TargetSet, ConfigError> {
    let targets = parse_targets(source.pairs())?;

    let watched: Vec<&str> = targets.keys().map(String::as_str).collect();
    info!("watching: {}", watched.join(", "));

    Ok(targets)
}

/// Build the target set from ordered key/value pairs.
///
/// Several `HOST_` keys pointing at the same address collapse into one
/// target, the last declaration wins the label. For the override keys the
/// first occurrence wins.
pub fn parse_targets<I, K, V>(pairs: I) -> Result<TargetSet, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let pairs: Vec<(String, String)> = pairs
        .into_iter()
        .map(|(key, value)| (key.as_ref().to_string(), value.as_ref().to_string()))
        .collect();

    let mut targets = TargetSet::new();
    for (key, value) in &pairs {
        let Some(label) = key.strip_prefix(HOST_PREFIX) else {
            continue;
        };
        if label.is_empty() {
            return Err(ConfigError::EmptyLabel { key: key.clone() });
        }

        let identity = value.trim();
        if identity.is_empty() {
            return Err(ConfigError::EmptyTarget { key: key.clone() });
        }

        targets.insert(identity.to_string(), CheckTarget::new(identity, label));
    }

    for target in targets.values_mut() {
        if let Some((key, value)) = lookup(&pairs, LATENCY_PREFIX, &target.label) {
            target.latency_budget = positive_duration(key, value)?;
        }
        if let Some((key, value)) = lookup(&pairs, PERIOD_PREFIX, &target.label) {
            target.period = positive_duration(key, value)?;
        }
        if let Some((_, value)) = lookup(&pairs, OVERLAP_PREFIX, &target.label) {
            target.overlap = value.parse::<OverlapPolicy>()?;
        }
    }

    Ok(targets)
}

fn lookup<'a>(pairs: &'a [(String, String)], prefix: &str, label: &str) -> Option<(&'a str, &'a str)> {
    pairs
        .iter()
        .find(|(key, _)| key.strip_prefix(prefix) == Some(label))
        .map(|(key, value)| (key.as_str(), value.as_str()))
}

fn positive_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let duration = parse_duration(value).map_err(|reason| ConfigError::InvalidDuration {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    })?;

    if duration.is_zero() {
        return Err(ConfigError::NonPositiveDuration { key: key.to_string() });
    }

    Ok(duration)
}
