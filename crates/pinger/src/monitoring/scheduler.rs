use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::executor::Probe;
use super::guard::check_with_deadline;
use crate::reporter::Reporter;
use crate::shutdown::ShutdownController;
use crate::DEFAULT_PERIOD;
use crate::target::{CheckTarget, OverlapPolicy};

/// Monitoring scheduler - drives one periodic check loop per target
pub struct MonitoringScheduler {
    probe: Arc<dyn Probe>,
    reporter: Arc<dyn Reporter>,
    shutdown: ShutdownController,
}

impl MonitoringScheduler {
    /// Create a new monitoring scheduler
    pub fn new(probe: Arc<dyn Probe>, reporter: Arc<dyn Reporter>, shutdown: ShutdownController) -> Self {
        Self { probe, reporter, shutdown }
    }

    /// Schedule a single target for periodic checking.
    ///
    /// The first run starts one period after scheduling, then one per
    /// period. A zero period falls back to [`DEFAULT_PERIOD`]. Every run is
    /// dispatched as its own task, so a slow run never delays the next tick.
    /// The returned task ends once shutdown is requested; runs already in
    /// flight are not waited for.
    pub fn schedule_target(&self, target: CheckTarget) -> JoinHandle<()> {
        let probe = self.probe.clone();
        let reporter = self.reporter.clone();
        let shutdown = self.shutdown.clone();
        let target = Arc::new(target);

        tokio::spawn(async move {
            let in_flight = Arc::new(Mutex::new(()));
            let period = match target.period() {
                period if period.is_zero() => {
                    warn!(address = target.identity(), "zero check period, using {DEFAULT_PERIOD:?}");
                    DEFAULT_PERIOD
                }
                period => period,
            };
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.wait() => break,
                    _ = timer.tick() => {}
                }

                let permit = match target.overlap() {
                    OverlapPolicy::Allow => None,
                    OverlapPolicy::Skip => match in_flight.clone().try_lock_owned() {
                        Ok(permit) => Some(permit),
                        Err(_) => {
                            debug!(address = target.identity(), "previous run still in flight, skipping tick");
                            continue;
                        }
                    },
                };

                dispatch(probe.clone(), reporter.clone(), target.clone(), permit);
            }

            info!(address = target.identity(), "scheduler stopped");
        })
    }

    /// Schedule multiple targets
    pub fn schedule_targets(&self, targets: impl IntoIterator<Item = CheckTarget>) -> Vec<JoinHandle<()>> {
        targets.into_iter().map(|target| self.schedule_target(target)).collect()
    }
}

fn dispatch(
    probe: Arc<dyn Probe>,
    reporter: Arc<dyn Reporter>,
    target: Arc<CheckTarget>,
    permit: Option<OwnedMutexGuard<()>>,
) {
    tokio::spawn(async move {
        let outcome = check_with_deadline(probe, target.clone()).await;
        reporter.record(target.label(), target.identity(), outcome.status());
        drop(permit);
    });
}
