use thiserror::Error;

/// Errors raised while turning key/value pairs into targets.
///
/// All of these are fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is empty, expected a target address")]
    EmptyTarget { key: String },

    #[error("{key} declares a target without a name")]
    EmptyLabel { key: String },

    #[error("{key}={value:?} is not a valid duration: {reason}")]
    InvalidDuration { key: String, value: String, reason: String },

    #[error("{key} must be a positive duration")]
    NonPositiveDuration { key: String },

    #[error("unknown overlap policy {0:?}, expected \"allow\" or \"skip\"")]
    InvalidOverlapPolicy(String),
}
