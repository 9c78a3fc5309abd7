//! Pipeline configuration.
//!
//! Every section has defaults, so an empty file (or no file at all) yields
//! the standard hourly setup: SARIMA(1,1,1)(1,1,1)\[24\], a 48-hour horizon and
//! 95 % intervals. Command-line flags override whatever is loaded here.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use config::{Config, File, FileFormat};
use serde::Deserialize;

use crate::data::parse_timestamp;
use crate::error::{ForecastError, Result};
use crate::interval::z_score;
use crate::models::arima::SARIMASpec;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV file to read. May also come from the command line.
    pub path: Option<PathBuf>,
    pub value_column: String,
    /// Column holding observation times. Absent means synthesise them.
    pub timestamp_column: Option<String>,
    /// First synthesised timestamp, RFC 3339.
    pub start: String,
    pub frequency_minutes: i64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: None,
            value_column: "active_followers".to_string(),
            timestamp_column: None,
            start: "2020-01-01T00:00:00Z".to_string(),
            frequency_minutes: 60,
        }
    }
}

impl DataConfig {
    pub fn start_time(&self) -> Result<DateTime<Utc>> {
        parse_timestamp(&self.start).map_err(|e| ForecastError::Config(format!("data.start: {e}")))
    }

    pub fn frequency(&self) -> Result<Duration> {
        if self.frequency_minutes <= 0 {
            return Err(ForecastError::Config(format!(
                "data.frequency_minutes must be positive, got {}",
                self.frequency_minutes
            )));
        }
        Duration::try_minutes(self.frequency_minutes).ok_or_else(|| {
            ForecastError::Config(format!(
                "data.frequency_minutes out of range: {}",
                self.frequency_minutes
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// `[p, d, q]`.
    pub order: [usize; 3],
    /// `[P, D, Q, s]`.
    pub seasonal_order: [usize; 4],
    pub include_mean: Option<bool>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            order: [1, 1, 1],
            seasonal_order: [1, 1, 1, 24],
            include_mean: None,
        }
    }
}

impl ModelConfig {
    pub fn spec(&self) -> SARIMASpec {
        let [p, d, q] = self.order;
        let [cap_p, cap_d, cap_q, s] = self.seasonal_order;
        SARIMASpec::new(p, d, q, cap_p, cap_d, cap_q, s)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub horizon: usize,
    pub confidence_level: f64,
    /// Extra shift applied to every forecast timestamp.
    pub calendar_offset_minutes: i64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 48,
            confidence_level: 0.95,
            calendar_offset_minutes: 0,
        }
    }
}

impl ForecastConfig {
    pub fn calendar_offset(&self) -> Result<Duration> {
        Duration::try_minutes(self.calendar_offset_minutes).ok_or_else(|| {
            ForecastError::Config(format!(
                "forecast.calendar_offset_minutes out of range: {}",
                self.calendar_offset_minutes
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub max_lag: usize,
    /// Run the order search and log its ranking.
    pub suggest_orders: bool,
    pub ljung_box_lags: Option<usize>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            max_lag: 48,
            suggest_orders: false,
            ljung_box_lags: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Trailing observations to draw; everything when absent.
    pub history_window: Option<usize>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Active followers: forecast".to_string(),
            width: 1200,
            height: 600,
            history_window: None,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub forecast: ForecastConfig,
    pub diagnostics: DiagnosticsConfig,
    pub chart: ChartConfig,
}

impl PipelineConfig {
    /// Load from a TOML file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialisation alone cannot.
    pub fn validate(&self) -> Result<()> {
        if self.data.value_column.trim().is_empty() {
            return Err(ForecastError::Config("data.value_column is empty".to_string()));
        }
        self.data.start_time()?;
        self.data.frequency()?;

        self.model
            .spec()
            .validate()
            .map_err(|e| ForecastError::Config(format!("model: {e}")))?;

        if self.forecast.horizon == 0 {
            return Err(ForecastError::Config("forecast.horizon must be at least 1".to_string()));
        }
        z_score(self.forecast.confidence_level)?;
        self.forecast.calendar_offset()?;

        if self.diagnostics.max_lag == 0 {
            return Err(ForecastError::Config("diagnostics.max_lag must be at least 1".to_string()));
        }
        if self.diagnostics.ljung_box_lags == Some(0) {
            return Err(ForecastError::Config(
                "diagnostics.ljung_box_lags must be at least 1".to_string(),
            ));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ForecastError::Config("chart dimensions must be non-zero".to_string()));
        }
        if self.chart.history_window == Some(0) {
            return Err(ForecastError::Config(
                "chart.history_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
