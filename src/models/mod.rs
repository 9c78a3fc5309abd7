//! Forecasting models.

mod traits;

pub mod arima;

pub use traits::{BoxedForecaster, Forecaster};
