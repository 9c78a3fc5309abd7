//! Confidence bounds from point forecasts and standard errors.
//!
//! For a confidence level `c`, each step gets the symmetric interval
//! `point ± z * standard_error` with `z = Φ⁻¹((1 + c) / 2)`.

use crate::error::{ForecastError, Result};
use crate::utils::stats::quantile_normal;

/// Lower and upper bound of one forecast step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Distance between the bounds.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whether `value` lies inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Two-sided normal critical value for `level`.
///
/// `level` must be finite and strictly between 0 and 1.
pub fn z_score(level: f64) -> Result<f64> {
    if !(level.is_finite() && level > 0.0 && level < 1.0) {
        return Err(ForecastError::InvalidArgument(format!(
            "confidence level must be strictly between 0 and 1, got {level}"
        )));
    }
    Ok(quantile_normal((1.0 + level) / 2.0))
}

/// Build one interval per forecast step.
///
/// Fails with [`ForecastError::InvalidArgument`] for a level outside (0, 1),
/// a negative or non-finite standard error, or a non-finite point, and with
/// [`ForecastError::DimensionMismatch`] if the inputs differ in length.
pub fn confidence_intervals(
    points: &[f64],
    standard_errors: &[f64],
    level: f64,
) -> Result<Vec<ConfidenceInterval>> {
    let z = z_score(level)?;

    if points.len() != standard_errors.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: points.len(),
            got: standard_errors.len(),
        });
    }

    points
        .iter()
        .zip(standard_errors)
        .enumerate()
        .map(|(step, (&point, &se))| {
            if !point.is_finite() {
                return Err(ForecastError::InvalidArgument(format!(
                    "point forecast at step {step} is not finite"
                )));
            }
            if !(se.is_finite() && se >= 0.0) {
                return Err(ForecastError::InvalidArgument(format!(
                    "standard error at step {step} must be a non-negative finite number, got {se}"
                )));
            }
            let margin = z * se;
            Ok(ConfidenceInterval {
                lower: point - margin,
                upper: point + margin,
            })
        })
        .collect()
}
