//! In-sample accuracy metrics for fitted models.

use crate::error::{ForecastError, Result};

/// Accuracy of fitted values against observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (None if any actual is zero)
    pub mape: Option<f64>,
    /// Number of pairs compared.
    pub n: usize,
}

/// Compare `actual` with `predicted`, skipping pairs where either side is NaN.
///
/// Fitted values from a differenced model are undefined for the first few
/// observations; those positions hold NaN and are ignored here.
pub fn accuracy(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let pairs: Vec<(f64, f64)> = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| !a.is_nan() && !p.is_nan())
        .map(|(&a, &p)| (a, p))
        .collect();

    if pairs.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    let n = pairs.len() as f64;
    let mae = pairs.iter().map(|(a, p)| (a - p).abs()).sum::<f64>() / n;
    let rmse = (pairs.iter().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / n).sqrt();
    let mape = if pairs.iter().any(|(a, _)| *a == 0.0) {
        None
    } else {
        Some(100.0 * pairs.iter().map(|(a, p)| ((a - p) / a).abs()).sum::<f64>() / n)
    };

    Ok(AccuracyMetrics {
        mae,
        rmse,
        mape,
        n: pairs.len(),
    })
}
