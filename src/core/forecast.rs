//! Forecast result structure for holding predictions.

use crate::error::{ForecastError, Result};
use crate::interval::{confidence_intervals, ConfidenceInterval};

/// One step of a forecast: the future time index, the point estimate and
/// its standard error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastStep {
    /// Index on the model's time axis. The first step of a forecast made
    /// after `n` observations has index `n`.
    pub index: usize,
    /// Point estimate.
    pub point: f64,
    /// Standard error of the point estimate.
    pub standard_error: f64,
}

/// A forecast result: point predictions, their standard errors and, once
/// requested, confidence bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    start_index: usize,
    point: Vec<f64>,
    standard_errors: Vec<f64>,
    intervals: Option<(f64, Vec<ConfidenceInterval>)>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions and standard errors.
    ///
    /// `start_index` is the time index of the first step.
    pub fn from_parts(start_index: usize, point: Vec<f64>, standard_errors: Vec<f64>) -> Result<Self> {
        if point.len() != standard_errors.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: point.len(),
                got: standard_errors.len(),
            });
        }
        Ok(Self {
            start_index,
            point,
            standard_errors,
            intervals: None,
        })
    }

    /// Attach confidence bounds at `level`, computed from the stored
    /// standard errors.
    pub fn with_intervals(mut self, level: f64) -> Result<Self> {
        let bounds = confidence_intervals(&self.point, &self.standard_errors, level)?;
        self.intervals = Some((level, bounds));
        Ok(self)
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Time index of the first step.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Time indices of all steps.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start_index..self.start_index + self.point.len()
    }

    /// Point predictions.
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    /// Standard errors, aligned with [`Forecast::point`].
    pub fn standard_errors(&self) -> &[f64] {
        &self.standard_errors
    }

    /// `(index, point, standard error)` for every step.
    pub fn steps(&self) -> impl Iterator<Item = ForecastStep> + '_ {
        self.indices()
            .zip(self.point.iter().zip(&self.standard_errors))
            .map(|(index, (&point, &standard_error))| ForecastStep {
                index,
                point,
                standard_error,
            })
    }

    /// Whether confidence bounds are attached.
    pub fn has_intervals(&self) -> bool {
        self.intervals.is_some()
    }

    /// Confidence level of the attached bounds.
    pub fn level(&self) -> Option<f64> {
        self.intervals.as_ref().map(|(level, _)| *level)
    }

    /// Attached confidence bounds.
    pub fn intervals(&self) -> Option<&[ConfidenceInterval]> {
        self.intervals.as_ref().map(|(_, bounds)| bounds.as_slice())
    }

    /// Lower bounds, if intervals are attached.
    pub fn lower(&self) -> Option<Vec<f64>> {
        self.intervals()
            .map(|bounds| bounds.iter().map(|b| b.lower).collect())
    }

    /// Upper bounds, if intervals are attached.
    pub fn upper(&self) -> Option<Vec<f64>> {
        self.intervals()
            .map(|bounds| bounds.iter().map(|b| b.upper).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn forecast_empty_state() {
        let forecast = Forecast::new();
        assert!(forecast.is_empty());
        assert_eq!(forecast.horizon(), 0);
        assert_eq!(forecast.steps().count(), 0);
        assert!(!forecast.has_intervals());
        assert!(forecast.lower().is_none());
    }

    #[test]
    fn steps_carry_indices_after_history() {
        let forecast = Forecast::from_parts(100, vec![1.0, 2.0, 3.0], vec![0.5, 0.6, 0.7]).unwrap();
        let steps: Vec<_> = forecast.steps().collect();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].index, 100);
        assert_eq!(steps[2].index, 102);
        assert_eq!(steps[1].point, 2.0);
        assert_eq!(steps[1].standard_error, 0.6);
        assert_eq!(forecast.indices(), 100..103);
    }

    #[test]
    fn rejects_mismatched_parts() {
        assert!(matches!(
            Forecast::from_parts(0, vec![1.0, 2.0], vec![0.1]),
            Err(ForecastError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn attaches_intervals() {
        let forecast = Forecast::from_parts(10, vec![10.0, 20.0], vec![2.0, 0.0])
            .unwrap()
            .with_intervals(0.95)
            .unwrap();

        assert!(forecast.has_intervals());
        assert_eq!(forecast.level(), Some(0.95));

        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        assert_relative_eq!(lower[0], 6.08, epsilon = 0.01);
        assert_relative_eq!(upper[0], 13.92, epsilon = 0.01);
        assert_eq!(lower[1], 20.0);
        assert_eq!(upper[1], 20.0);
    }

    #[test]
    fn invalid_level_leaves_no_intervals() {
        let forecast = Forecast::from_parts(0, vec![1.0], vec![1.0]).unwrap();
        assert!(matches!(
            forecast.with_intervals(1.0),
            Err(ForecastError::InvalidArgument(_))
        ));
    }
}
