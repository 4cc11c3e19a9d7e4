use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};
use url::{Host, Url};

use super::checker::{
    CertificateChecker, DnsResolver, HttpChecker, NameResolver, ReachabilityChecker, TlsChecker,
};
use super::guard::past_deadline;
use super::types::{CheckError, Outcome, SetupError};
use crate::target::CheckTarget;

/// Anything that turns a target into one classified outcome
#[async_trait::async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn probe(&self, target: &CheckTarget) -> Outcome;
}

/// Verification pipeline - runs the check cascade for one target
///
/// Stages run strictly in order and the first failure ends the run:
/// canonical name, address lookup, reachability, and for `https` targets the
/// certificate. One pipeline is shared by every scheduler.
pub struct VerificationPipeline {
    resolver: Arc<dyn NameResolver>,
    reachability: Arc<dyn ReachabilityChecker>,
    certificates: Arc<dyn CertificateChecker>,
}

impl VerificationPipeline {
    /// Create a pipeline with the network-backed stages. `io_timeout` bounds
    /// each network stage on its own, so a run abandoned by its deadline
    /// still releases its connections.
    pub fn new(io_timeout: Duration) -> Result<Self, SetupError> {
        Ok(Self::with_checkers(
            Arc::new(DnsResolver::from_system_conf()),
            Arc::new(HttpChecker::new(io_timeout)?),
            Arc::new(TlsChecker::new(io_timeout)?),
        ))
    }

    /// Create a pipeline from explicit stages
    pub fn with_checkers(
        resolver: Arc<dyn NameResolver>,
        reachability: Arc<dyn ReachabilityChecker>,
        certificates: Arc<dyn CertificateChecker>,
    ) -> Self {
        Self { resolver, reachability, certificates }
    }

    async fn cascade(&self, target: &CheckTarget) -> Result<(), CheckError> {
        let invalid = |reason: String| CheckError::InvalidTarget {
            target: target.identity().to_string(),
            reason,
        };

        let url = Url::parse(target.identity()).map_err(|error| invalid(error.to_string()))?;
        let host = url.host().ok_or_else(|| invalid("missing host".to_string()))?;

        let (server_name, resolved_addresses) = match host {
            Host::Ipv4(ip) => (ip.to_string(), vec![IpAddr::V4(ip)]),
            Host::Ipv6(ip) => (ip.to_string(), vec![IpAddr::V6(ip)]),
            Host::Domain(name) => match name.parse::<IpAddr>() {
                Ok(ip) => (name.to_string(), vec![ip]),
                Err(_) => (name.to_string(), self.resolve(name).await?),
            },
        };

        let status = self.reachability.reach(&url).await?;
        debug!(address = target.identity(), status, "target is reachable");

        if url.scheme() == "https" {
            let port = url.port_or_known_default().unwrap_or(443);
            let addrs: Vec<SocketAddr> =
                resolved_addresses.iter().map(|ip| SocketAddr::new(*ip, port)).collect();

            let not_after = self.certificates.check(&server_name, &addrs).await?;
            debug!(address = target.identity(), %not_after, "certificate is valid");
        }

        Ok(())
    }

    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, CheckError> {
        let canonical = self.resolver.canonical_name(host).await?;
        debug!(host, %canonical, "resolved canonical name");

        let addresses = self.resolver.lookup_ip(host).await?;
        if addresses.is_empty() {
            return Err(CheckError::NoAddresses { host: host.to_string() });
        }
        debug!(host, ?addresses, "resolved addresses");

        Ok(addresses)
    }
}

#[async_trait::async_trait]
impl Probe for VerificationPipeline {
    async fn probe(&self, target: &CheckTarget) -> Outcome {
        match self.cascade(target).await {
            Ok(()) => Outcome::Healthy,
            Err(err) => {
                let kind = err.kind();
                if past_deadline() {
                    debug!(
                        address = target.identity(),
                        label = target.label(),
                        status = %kind,
                        "abandoned run failed after its deadline, result discarded: {err}"
                    );
                } else {
                    error!(address = target.identity(), label = target.label(), status = %kind, "check failed: {err}");
                }
                Outcome::Unhealthy(kind)
            }
        }
    }
}
