//! Monitored endpoints.
//!
//! A [`CheckTarget`] is built once from configuration and shared read-only by
//! its scheduler and every check run for the rest of the process lifetime.

mod methods;
mod types;

pub use types::{CheckTarget, OverlapPolicy, TargetSet};
