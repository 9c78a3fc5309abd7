//! Numeric helpers shared by the models and diagnostics.

pub mod metrics;
pub mod optimization;
pub mod stats;

pub use metrics::{accuracy, AccuracyMetrics};
pub use optimization::{nelder_mead, SimplexConfig, SimplexResult};
pub use stats::quantile_normal;
