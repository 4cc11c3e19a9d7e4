//! Process-wide tracing setup shared by the workspace binaries

mod tracing;

pub use tracing::init_tracing;
