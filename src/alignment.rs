//! Mapping forecast step indices to wall-clock timestamps.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};

/// Maps a time index `k` to `origin + k * step + offset`.
///
/// With `origin` set to the first observation and a zero offset, index `n`
/// (the first step after `n` observations) lands exactly one step after the
/// last observed timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastAlignment {
    origin: DateTime<Utc>,
    step: Duration,
    offset: Duration,
}

impl ForecastAlignment {
    /// Create an alignment with no calendar offset.
    pub fn new(origin: DateTime<Utc>, step: Duration) -> Result<Self> {
        if step <= Duration::zero() {
            return Err(ForecastError::InvalidArgument(
                "alignment step must be positive".to_string(),
            ));
        }
        Ok(Self {
            origin,
            step,
            offset: Duration::zero(),
        })
    }

    /// Hourly alignment starting at `origin`.
    pub fn hourly(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            step: Duration::hours(1),
            offset: Duration::zero(),
        }
    }

    /// Alignment matching `series`: its first timestamp and spacing.
    pub fn for_series(series: &TimeSeries) -> Result<Self> {
        let origin = series.start().ok_or(ForecastError::EmptyData)?;
        let step = series.frequency().ok_or(ForecastError::InsufficientData {
            needed: 2,
            got: series.len(),
        })?;
        if !series.is_regular() {
            return Err(ForecastError::TimestampError(
                "series timestamps are not equally spaced".to_string(),
            ));
        }
        Self::new(origin, step)
    }

    /// Shift every mapped timestamp by a fixed calendar offset.
    pub fn with_offset(mut self, offset: Duration) -> Self {
        self.offset = offset;
        self
    }

    pub fn origin(&self) -> DateTime<Utc> {
        self.origin
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }

    /// Timestamp of time index `index`.
    pub fn timestamp(&self, index: usize) -> Result<DateTime<Utc>> {
        let overflow = || ForecastError::TimestampError(format!("index {index} overflows"));

        let millis = i64::try_from(index)
            .ok()
            .and_then(|k| self.step.num_milliseconds().checked_mul(k))
            .ok_or_else(overflow)?;
        let elapsed = Duration::try_milliseconds(millis).ok_or_else(overflow)?;

        self.origin
            .checked_add_signed(elapsed)
            .and_then(|t| t.checked_add_signed(self.offset))
            .ok_or_else(overflow)
    }

    /// Timestamps of every step in `forecast`.
    pub fn timestamps(&self, forecast: &Forecast) -> Result<Vec<DateTime<Utc>>> {
        forecast.indices().map(|k| self.timestamp(k)).collect()
    }
}
