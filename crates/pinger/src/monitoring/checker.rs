//! Pipeline stages.
//!
//! Each stage sits behind its own trait so the pipeline can be driven with
//! doubles; the structs here are the network-backed implementations.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioResolver;
use reqwest::redirect::Policy;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::warn;
use url::Url;

use super::types::CheckError;

/// DNS stages: canonical name and address lookup
#[async_trait::async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve `host` to its canonical name. A name without a CNAME record
    /// resolves to itself.
    async fn canonical_name(&self, host: &str) -> Result<String, CheckError>;

    /// Resolve `host` to its IP addresses
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, CheckError>;
}

/// Application-level reachability stage
#[async_trait::async_trait]
pub trait ReachabilityChecker: Send + Sync {
    /// Issue one request and return the response status code
    async fn reach(&self, url: &Url) -> Result<u16, CheckError>;
}

/// Transport security stage
#[async_trait::async_trait]
pub trait CertificateChecker: Send + Sync {
    /// Complete a TLS handshake with `host` over one of `addrs` and return
    /// the expiry of the presented leaf certificate
    async fn check(&self, host: &str, addrs: &[SocketAddr]) -> Result<DateTime<Utc>, CheckError>;
}

/// Resolver backed by hickory
pub struct DnsResolver {
    resolver: TokioResolver,
}

impl DnsResolver {
    /// Use the system resolver configuration, falling back to Cloudflare
    /// when it cannot be read
    pub fn from_system_conf() -> Self {
        let builder = TokioResolver::builder_tokio().unwrap_or_else(|error| {
            warn!("Failed to read system resolver configuration, using Cloudflare: {error}");
            TokioResolver::builder_with_config(ResolverConfig::cloudflare(), TokioConnectionProvider::default())
        });

        Self { resolver: builder.build() }
    }
}

#[async_trait::async_trait]
impl NameResolver for DnsResolver {
    async fn canonical_name(&self, host: &str) -> Result<String, CheckError> {
        match self.resolver.lookup(host, RecordType::CNAME).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .find_map(|rdata| rdata.as_cname())
                .map(|cname| cname.0.to_utf8())
                .unwrap_or_else(|| host.to_string())),
            // The name exists but carries no CNAME record
            Err(error) if error.is_no_records_found() && !error.is_nx_domain() => Ok(host.to_string()),
            Err(error) => {
                Err(CheckError::CanonicalName { host: host.to_string(), reason: error.to_string() })
            }
        }
    }

    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, CheckError> {
        let lookup = self
            .resolver
            .lookup_ip(host)
            .await
            .map_err(|error| CheckError::AddressLookup { host: host.to_string(), reason: error.to_string() })?;

        Ok(lookup.iter().collect())
    }
}

/// HTTP/HTTPS reachability checker
///
/// Any response counts, including error statuses and redirects. Certificates
/// are not verified here, the certificate stage owns that verdict.
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(io_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(io_timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(true)
            .user_agent(concat!("pinger/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ReachabilityChecker for HttpChecker {
    async fn reach(&self, url: &Url) -> Result<u16, CheckError> {
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(CheckError::UnsupportedScheme(other.to_string())),
        }

        let response = self.client.get(url.clone()).send().await?;

        Ok(response.status().as_u16())
    }
}

/// TLS certificate checker
pub struct TlsChecker {
    connector: TlsConnector,
    io_timeout: Duration,
}

impl TlsChecker {
    /// Trust the Mozilla root program
    pub fn new(io_timeout: Duration) -> Result<Self, rustls::Error> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Self::with_roots(roots, io_timeout)
    }

    /// Trust only the given roots
    pub fn with_roots(roots: RootCertStore, io_timeout: Duration) -> Result<Self, rustls::Error> {
        let config = ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(roots)
            .with_no_client_auth();

        Ok(Self { connector: TlsConnector::from(Arc::new(config)), io_timeout })
    }
}

#[async_trait::async_trait]
impl CertificateChecker for TlsChecker {
    async fn check(&self, host: &str, addrs: &[SocketAddr]) -> Result<DateTime<Utc>, CheckError> {
        let handshake_error =
            |reason: String| CheckError::Handshake { host: host.to_string(), reason };

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|error| handshake_error(error.to_string()))?;

        let handshake = async {
            let stream = TcpStream::connect(addrs).await?;
            self.connector.connect(server_name, stream).await
        };

        let stream = timeout(self.io_timeout, handshake)
            .await
            .map_err(|_| handshake_error(format!("no handshake within {:?}", self.io_timeout)))?
            .map_err(|error| handshake_error(error.to_string()))?;

        let (_, connection) = stream.get_ref();
        let leaf = connection
            .peer_certificates()
            .and_then(|certificates| certificates.first())
            .ok_or_else(|| CheckError::MissingCertificate { host: host.to_string() })?;

        ensure_not_expired(host, leaf.as_ref(), Utc::now())
    }
}

/// Parse a DER certificate and require its `NotAfter` to be strictly after
/// `now`. Returns the expiry.
pub fn ensure_not_expired(host: &str, der: &[u8], now: DateTime<Utc>) -> Result<DateTime<Utc>, CheckError> {
    let malformed = |reason: String| CheckError::MalformedCertificate { host: host.to_string(), reason };

    let (_, certificate) =
        x509_parser::parse_x509_certificate(der).map_err(|error| malformed(error.to_string()))?;

    let not_after = DateTime::<Utc>::from_timestamp(certificate.validity().not_after.timestamp(), 0)
        .ok_or_else(|| malformed("NotAfter is out of range".to_string()))?;

    if not_after <= now {
        return Err(CheckError::Expired { host: host.to_string(), not_after });
    }

    Ok(not_after)
}
