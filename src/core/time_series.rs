//! Univariate, regularly spaced observation series.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};

/// An ordered series of observations with their timestamps.
///
/// Timestamps are strictly increasing. Values are immutable once the series
/// is built; models borrow them through [`TimeSeries::values`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
}

impl TimeSeries {
    /// Create a series from parallel timestamp and value vectors.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        if let Some(pos) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ForecastError::TimestampError(format!(
                "timestamps must be strictly increasing (row {} is not after row {})",
                pos + 1,
                pos
            )));
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
        })
    }

    /// Create a series with timestamps `start + i * step`.
    pub fn regular(start: DateTime<Utc>, step: Duration, values: Vec<f64>) -> Result<Self> {
        if step <= Duration::zero() {
            return Err(ForecastError::InvalidArgument(
                "series spacing must be positive".to_string(),
            ));
        }
        let timestamps = (0..values.len())
            .map(|i| {
                let offset = i32::try_from(i)
                    .ok()
                    .and_then(|i| step.checked_mul(i))
                    .ok_or_else(|| {
                        ForecastError::TimestampError(format!("offset {i} overflows"))
                    })?;
                start.checked_add_signed(offset).ok_or_else(|| {
                    ForecastError::TimestampError(format!("timestamp {i} is out of range"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::univariate(timestamps, values)
    }

    /// Create an hourly series starting at `start`.
    pub fn hourly(start: DateTime<Utc>, values: Vec<f64>) -> Result<Self> {
        Self::regular(start, Duration::hours(1), values)
    }

    /// Attach a display label (usually the source column name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Display label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First timestamp.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    /// Last timestamp.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Spacing between the first two observations.
    ///
    /// Returns `None` for series with fewer than two observations.
    pub fn frequency(&self) -> Option<Duration> {
        match self.timestamps.as_slice() {
            [a, b, ..] => Some(*b - *a),
            _ => None,
        }
    }

    /// Whether every consecutive pair of timestamps has the same spacing.
    pub fn is_regular(&self) -> bool {
        match self.frequency() {
            Some(step) => self.timestamps.windows(2).all(|w| w[1] - w[0] == step),
            None => true,
        }
    }

    /// The last `n` observations (or the whole series if shorter).
    pub fn tail(&self, n: usize) -> TimeSeries {
        let skip = self.len().saturating_sub(n);
        TimeSeries {
            timestamps: self.timestamps[skip..].to_vec(),
            values: self.values[skip..].to_vec(),
            label: self.label.clone(),
        }
    }

    /// Minimum and maximum value, ignoring NaN.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
