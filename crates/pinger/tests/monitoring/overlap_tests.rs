//! Overlapping runs of the same target

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pinger::monitoring::check_with_deadline;
use pinger::{CheckTarget, FailureKind, MemoryReporter, Outcome, Probe, Reporter};
use tokio::time::sleep;

/// Hands out scripted `(delay, outcome)` pairs in call order
struct ScriptedProbe {
    script: Vec<(Duration, Outcome)>,
    next: AtomicUsize,
}

#[async_trait::async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self, _target: &CheckTarget) -> Outcome {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        let (delay, outcome) = self.script[index];
        sleep(delay).await;
        outcome
    }
}

async fn guarded_run(probe: Arc<ScriptedProbe>, target: Arc<CheckTarget>, reporter: Arc<MemoryReporter>) {
    let outcome = check_with_deadline(probe, target.clone()).await;
    reporter.record(target.label(), target.identity(), outcome.status());
}

#[tokio::test(start_paused = true)]
async fn test_later_completing_run_wins() {
    let probe = Arc::new(ScriptedProbe {
        script: vec![
            (Duration::from_millis(200), Outcome::Unhealthy(FailureKind::CertificateInvalid)),
            (Duration::from_millis(10), Outcome::Healthy),
        ],
        next: AtomicUsize::new(0),
    });
    let target = Arc::new(CheckTarget::new("https://example.com", "EXAMPLE").with_latency_budget(Duration::from_secs(1)));
    let reporter = Arc::new(MemoryReporter::new());

    let first = guarded_run(probe.clone(), target.clone(), reporter.clone());
    let second = async {
        sleep(Duration::from_millis(5)).await;
        guarded_run(probe.clone(), target.clone(), reporter.clone()).await;
        // The later-started run finishes first
        assert_eq!(reporter.status("EXAMPLE", "https://example.com").as_deref(), Some("ok"));
    };
    tokio::join!(first, second);

    assert_eq!(reporter.record_count(), 2);
    assert_eq!(reporter.status("EXAMPLE", "https://example.com").as_deref(), Some("certificate-invalid"));
}

#[tokio::test(start_paused = true)]
async fn test_flip_to_unhealthy_overwrites() {
    let probe = Arc::new(ScriptedProbe {
        script: vec![
            (Duration::from_millis(10), Outcome::Healthy),
            (Duration::from_millis(10), Outcome::Unhealthy(FailureKind::Reachability)),
        ],
        next: AtomicUsize::new(0),
    });
    let target = Arc::new(CheckTarget::new("https://example.com", "EXAMPLE"));
    let reporter = Arc::new(MemoryReporter::new());

    guarded_run(probe.clone(), target.clone(), reporter.clone()).await;
    assert_eq!(reporter.status("EXAMPLE", "https://example.com").as_deref(), Some("ok"));

    guarded_run(probe, target, reporter.clone()).await;
    assert_eq!(reporter.status("EXAMPLE", "https://example.com").as_deref(), Some("reachability-failure"));
}
