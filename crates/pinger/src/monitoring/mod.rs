/// Monitoring engine module - runs the availability checks
///
/// This module is responsible for:
/// - The ordered check stages (DNS, reachability, TLS certificate)
/// - Bounding every run by its latency budget
/// - Scheduling runs per target and handing outcomes to a reporter
pub mod checker;
pub mod executor;
pub mod guard;
pub mod scheduler;
pub mod types;

pub use executor::{Probe, VerificationPipeline};
pub use guard::check_with_deadline;
pub use scheduler::MonitoringScheduler;
pub use types::{CheckError, FailureKind, Outcome, SetupError};
