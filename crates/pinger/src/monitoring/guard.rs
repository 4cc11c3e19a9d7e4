//! Deadline enforcement for a single check run.

use std::sync::Arc;

use tokio::time::{Instant, timeout_at};
use tracing::error;

use super::executor::Probe;
use super::types::{FailureKind, Outcome};
use crate::target::CheckTarget;

tokio::task_local! {
    static DEADLINE: Instant;
}

/// Whether the guarded run executing on this task has outlived its deadline.
/// Always false outside [`check_with_deadline`].
pub(crate) fn past_deadline() -> bool {
    DEADLINE.try_with(|deadline| Instant::now() >= *deadline).unwrap_or(false)
}

/// Run `probe` against `target` within the target's latency budget.
///
/// The probe runs as its own task raced against the deadline. When the
/// deadline wins, `timeout-exceeded` is returned right away and the task is
/// left to finish on its own; whatever it produces afterwards is dropped.
/// A run that completes at or after the deadline, before the timer got to
/// fire, is reported as a timeout as well.
pub async fn check_with_deadline<P>(probe: Arc<P>, target: Arc<CheckTarget>) -> Outcome
where
    P: Probe + ?Sized,
{
    let budget = target.latency_budget();
    let deadline = Instant::now() + budget;

    let run_target = Arc::clone(&target);
    let run = tokio::spawn(DEADLINE.scope(deadline, async move { probe.probe(&run_target).await }));

    // Dropping the join handle on timeout detaches the run instead of aborting it
    match timeout_at(deadline, run).await {
        Ok(Ok(outcome)) if Instant::now() < deadline => outcome,
        Ok(Err(join_error)) if Instant::now() < deadline => {
            error!(address = target.identity(), label = target.label(), "check run failed: {join_error}");
            Outcome::Unhealthy(FailureKind::Reachability)
        }
        _ => {
            error!(address = target.identity(), label = target.label(), "timeout exceeded after {budget:?}");
            Outcome::Unhealthy(FailureKind::TimeoutExceeded)
        }
    }
}
