use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Classified reason a check run did not come back healthy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The target could not be parsed, or its name or addresses did not resolve
    NameResolution,
    /// The application-level request could not be dispatched
    Reachability,
    /// TLS handshake failed, no certificate was presented, or it has expired
    CertificateInvalid,
    /// The whole pipeline did not finish within the latency budget
    TimeoutExceeded,
}

impl FailureKind {
    /// Token exported as the metric status label
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NameResolution => "name-resolution-failure",
            FailureKind::Reachability => "reachability-failure",
            FailureKind::CertificateInvalid => "certificate-invalid",
            FailureKind::TimeoutExceeded => "timeout-exceeded",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one check run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Healthy,
    Unhealthy(FailureKind),
}

impl Outcome {
    /// Status label value, `"ok"` or the failure token
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Healthy => "ok",
            Outcome::Unhealthy(kind) => kind.as_str(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Outcome::Healthy)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

/// Why a pipeline stage failed
///
/// Every variant maps to exactly one [`FailureKind`].
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("invalid target address {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("couldn't resolve canonical name of {host}: {reason}")]
    CanonicalName { host: String, reason: String },

    #[error("couldn't look up addresses of {host}: {reason}")]
    AddressLookup { host: String, reason: String },

    #[error("{host} resolved to no addresses")]
    NoAddresses { host: String },

    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("TLS connection to {host} failed: {reason}")]
    Handshake { host: String, reason: String },

    #[error("{host} presented no certificate")]
    MissingCertificate { host: String },

    #[error("certificate of {host} could not be parsed: {reason}")]
    MalformedCertificate { host: String, reason: String },

    #[error("certificate of {host} has expired at {not_after}")]
    Expired { host: String, not_after: DateTime<Utc> },
}

impl CheckError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CheckError::InvalidTarget { .. }
            | CheckError::CanonicalName { .. }
            | CheckError::AddressLookup { .. }
            | CheckError::NoAddresses { .. } => FailureKind::NameResolution,
            CheckError::UnsupportedScheme(_) | CheckError::Request(_) => FailureKind::Reachability,
            CheckError::Handshake { .. }
            | CheckError::MissingCertificate { .. }
            | CheckError::MalformedCertificate { .. }
            | CheckError::Expired { .. } => FailureKind::CertificateInvalid,
        }
    }
}

/// Errors building the default pipeline stages
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to build TLS configuration: {0}")]
    Tls(#[from] rustls::Error),
}
