//! Model-identification and residual diagnostics.

pub mod autocorrelation;
pub mod residuals;

pub use autocorrelation::{acf, pacf, CorrelationKind, Correlogram};
pub use residuals::{ljung_box, LjungBox};
