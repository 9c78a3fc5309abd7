//! Error types for the follower-forecast pipeline.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while loading, fitting, forecasting or rendering.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// An argument is outside its valid domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// The input file could not be read or parsed.
    #[error("data load error: {0}")]
    DataLoad(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Chart rendering failed.
    #[error("render error: {0}")]
    Render(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::DataLoad(err.to_string())
    }
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        ForecastError::DataLoad(err.to_string())
    }
}

impl From<config::ConfigError> for ForecastError {
    fn from(err: config::ConfigError) -> Self {
        ForecastError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failing_quantity() {
        let cases = [
            (
                ForecastError::InsufficientData { needed: 75, got: 30 },
                "insufficient data: need at least 75, got 30",
            ),
            (
                ForecastError::InvalidArgument("confidence level 1 is outside (0, 1)".into()),
                "invalid argument: confidence level 1 is outside (0, 1)",
            ),
            (
                ForecastError::DimensionMismatch { expected: 48, got: 47 },
                "dimension mismatch: expected 48, got 47",
            ),
            (
                ForecastError::Render("drawing area too small".into()),
                "render error: drawing area too small",
            ),
        ];
        for (err, text) in cases {
            assert_eq!(err.to_string(), text);
        }
    }

    #[test]
    fn io_errors_become_data_load_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "followers.csv");
        let err: ForecastError = io.into();
        assert!(matches!(err, ForecastError::DataLoad(msg) if msg.contains("followers.csv")));
    }

    #[test]
    fn pipeline_failures_can_be_compared() {
        let first = ForecastError::Config("forecast.horizon must be at least 1".into());
        assert_eq!(first.clone(), first);
        assert_ne!(first, ForecastError::MissingValues);
    }
}
