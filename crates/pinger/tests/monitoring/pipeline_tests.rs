//! Stage ordering and classification tests for the verification pipeline

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use pinger::monitoring::checker::HttpChecker;
use pinger::{CheckTarget, FailureKind, Outcome, Probe, VerificationPipeline};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{StaticResolver, StubCertificates, StubReachability, closed_port, init_test_tracing};

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn target(identity: &str) -> CheckTarget {
    CheckTarget::new(identity, "TEST")
}

#[tokio::test]
async fn test_unresolvable_name_stops_the_pipeline() {
    init_test_tracing();
    let resolver = Arc::new(StaticResolver::new());
    let reachability = Arc::new(StubReachability::reachable());
    let certificates = Arc::new(StubCertificates::valid());
    let pipeline = VerificationPipeline::with_checkers(resolver.clone(), reachability.clone(), certificates.clone());

    let outcome = pipeline.probe(&target("http://this-domain-does-not-exist.invalid")).await;

    assert_eq!(outcome, Outcome::Unhealthy(FailureKind::NameResolution));
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1, "address lookup must not run after a failed name lookup");
    assert_eq!(reachability.calls.load(Ordering::SeqCst), 0);
    assert_eq!(certificates.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_address_lookup_stops_the_pipeline() {
    let resolver = Arc::new(StaticResolver::new().with_name_only("example.com"));
    let reachability = Arc::new(StubReachability::reachable());
    let certificates = Arc::new(StubCertificates::valid());
    let pipeline = VerificationPipeline::with_checkers(resolver.clone(), reachability.clone(), certificates.clone());

    let outcome = pipeline.probe(&target("https://example.com")).await;

    assert_eq!(outcome, Outcome::Unhealthy(FailureKind::NameResolution));
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    assert_eq!(reachability.calls.load(Ordering::SeqCst), 0);
    assert_eq!(certificates.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_address_answer_is_a_resolution_failure() {
    let resolver = Arc::new(StaticResolver::new().with_host("example.com", vec![]));
    let reachability = Arc::new(StubReachability::reachable());
    let certificates = Arc::new(StubCertificates::valid());
    let pipeline = VerificationPipeline::with_checkers(resolver.clone(), reachability.clone(), certificates.clone());

    let outcome = pipeline.probe(&target("https://example.com")).await;

    assert_eq!(outcome, Outcome::Unhealthy(FailureKind::NameResolution));
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    assert_eq!(reachability.calls.load(Ordering::SeqCst), 0);
    assert_eq!(certificates.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unparsable_target_is_a_resolution_failure() {
    let resolver = Arc::new(StaticResolver::new());
    let reachability = Arc::new(StubReachability::reachable());
    let pipeline =
        VerificationPipeline::with_checkers(resolver.clone(), reachability.clone(), Arc::new(StubCertificates::valid()));

    let outcome = pipeline.probe(&target("exampleexample.com")).await;

    assert_eq!(outcome, Outcome::Unhealthy(FailureKind::NameResolution));
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    assert_eq!(reachability.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_target_skips_certificate_stage() {
    let resolver = Arc::new(StaticResolver::new().with_host("example.com", vec![LOCALHOST]));
    let certificates = Arc::new(StubCertificates::valid());
    let pipeline = VerificationPipeline::with_checkers(
        resolver.clone(),
        Arc::new(StubReachability::unreachable()),
        certificates.clone(),
    );

    let outcome = pipeline.probe(&target("https://example.com")).await;

    assert_eq!(outcome, Outcome::Unhealthy(FailureKind::Reachability));
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    assert_eq!(certificates.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_https_target_checks_certificate_on_resolved_addresses() {
    let resolver = Arc::new(StaticResolver::new().with_host("example.com", vec![LOCALHOST]));
    let certificates = Arc::new(StubCertificates::valid());
    let pipeline = VerificationPipeline::with_checkers(
        resolver,
        Arc::new(StubReachability::reachable()),
        certificates.clone(),
    );

    let outcome = pipeline.probe(&target("https://example.com:8443/status")).await;

    assert_eq!(outcome, Outcome::Healthy);
    assert_eq!(certificates.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*certificates.last_addrs.lock(), vec![SocketAddr::new(LOCALHOST, 8443)]);
}

#[tokio::test]
async fn test_expired_certificate_is_classified() {
    init_test_tracing();
    let resolver = Arc::new(StaticResolver::new().with_host("example.com", vec![LOCALHOST]));
    let reachability = Arc::new(StubReachability::reachable());
    let pipeline = VerificationPipeline::with_checkers(
        resolver,
        reachability.clone(),
        Arc::new(StubCertificates::expired()),
    );

    let outcome = pipeline.probe(&target("https://example.com")).await;

    assert_eq!(outcome, Outcome::Unhealthy(FailureKind::CertificateInvalid));
    assert_eq!(reachability.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_plain_target_never_checks_certificate() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

    let certificates = Arc::new(StubCertificates::expired());
    let pipeline = VerificationPipeline::with_checkers(
        Arc::new(StaticResolver::new()),
        Arc::new(HttpChecker::new(Duration::from_secs(5)).unwrap()),
        certificates.clone(),
    );

    let outcome = pipeline.probe(&target(&server.uri())).await;

    assert_eq!(outcome, Outcome::Healthy);
    assert_eq!(certificates.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_error_status_still_counts_as_reachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(503)).expect(1).mount(&server).await;

    let pipeline = VerificationPipeline::with_checkers(
        Arc::new(StaticResolver::new()),
        Arc::new(HttpChecker::new(Duration::from_secs(5)).unwrap()),
        Arc::new(StubCertificates::valid()),
    );

    let outcome = pipeline.probe(&target(&server.uri())).await;

    assert_eq!(outcome, Outcome::Healthy);
}

#[tokio::test]
async fn test_refused_connection_is_a_reachability_failure() {
    let port = closed_port().await;
    let pipeline = VerificationPipeline::with_checkers(
        Arc::new(StaticResolver::new()),
        Arc::new(HttpChecker::new(Duration::from_secs(5)).unwrap()),
        Arc::new(StubCertificates::valid()),
    );

    let outcome = pipeline.probe(&target(&format!("http://127.0.0.1:{port}/"))).await;

    assert_eq!(outcome, Outcome::Unhealthy(FailureKind::Reachability));
}

#[tokio::test]
async fn test_repeated_runs_against_healthy_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(2).mount(&server).await;

    let pipeline = VerificationPipeline::with_checkers(
        Arc::new(StaticResolver::new()),
        Arc::new(HttpChecker::new(Duration::from_secs(5)).unwrap()),
        Arc::new(StubCertificates::valid()),
    );
    let target = target(&server.uri());

    assert_eq!(pipeline.probe(&target).await, Outcome::Healthy);
    assert_eq!(pipeline.probe(&target).await, Outcome::Healthy);
}

#[tokio::test]
#[ignore = "requires network access"]
async fn test_public_targets() {
    let pipeline = VerificationPipeline::new(Duration::from_secs(10)).unwrap();

    let outcome = pipeline.probe(&target("http://this-domain-does-not-exist.invalid")).await;
    assert_eq!(outcome, Outcome::Unhealthy(FailureKind::NameResolution));

    let outcome = pipeline.probe(&target("https://example.com")).await;
    assert_eq!(outcome, Outcome::Healthy);
}
