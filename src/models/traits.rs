//! Forecaster trait defining the interface between the pipeline and a model.

use crate::core::{Forecast, TimeSeries};
use crate::error::Result;

/// Common interface for forecasting models.
///
/// A model is fitted once to a series and then asked for point forecasts
/// with standard errors. Confidence bounds are derived from those standard
/// errors, so implementors only provide [`Forecaster::predict`].
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Point forecasts and standard errors for the next `horizon` steps.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Forecasts with confidence bounds at `level`.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        self.predict(horizon)?.with_intervals(level)
    }

    /// In-sample one-step-ahead predictions, aligned with the fitted series.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// In-sample one-step-ahead errors.
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster>;
