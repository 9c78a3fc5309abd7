//! # follower-forecast
//!
//! Seasonal ARIMA forecasting of hourly follower activity.
//!
//! The crate loads an activity export, inspects its autocorrelation
//! structure, fits a SARIMA model by conditional sum of squares, forecasts
//! ahead with widening confidence bands, maps forecast steps onto calendar
//! time and renders the result as SVG.
//!
//! ```no_run
//! use follower_forecast::prelude::*;
//!
//! let config = PipelineConfig::load(None)?;
//! let series = follower_forecast::data::load_csv("activity.csv".as_ref(), &config.data)?;
//!
//! let mut model = SARIMA::from_spec(config.model.spec());
//! model.fit(&series)?;
//! let forecast = model.predict_with_intervals(48, 0.95)?;
//! let when = ForecastAlignment::for_series(&series)?.timestamps(&forecast)?;
//! # Ok::<(), ForecastError>(())
//! ```

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod alignment;
pub mod config;
pub mod core;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod interval;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::alignment::ForecastAlignment;
    pub use crate::config::PipelineConfig;
    pub use crate::core::{Forecast, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::interval::{confidence_intervals, ConfidenceInterval};
    pub use crate::models::arima::{SARIMASpec, SARIMA};
    pub use crate::models::Forecaster;
    pub use crate::utils::{accuracy, quantile_normal, AccuracyMetrics};
}
