//! Run analysis and persisted artifacts.

pub mod explain;
pub mod metrics;
pub mod run_log;

pub use run_log::{format_summary, print_summary, RunLog};
