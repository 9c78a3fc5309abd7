//! End-to-end run: load, diagnose, fit, forecast, bound, align, render.

use chrono::{DateTime, Utc};

use crate::alignment::ForecastAlignment;
use crate::config::PipelineConfig;
use crate::core::{Forecast, TimeSeries};
use crate::data::load_csv;
use crate::diagnostics::{ljung_box, Correlogram, LjungBox};
use crate::error::{ForecastError, Result};
use crate::models::arima::{
    apply_operator, differencing_operator, Candidate, OrderSearch, OrderSearchConfig, SARIMASpec,
    SARIMA,
};
use crate::models::Forecaster;
use crate::render::{correlogram_svg, forecast_chart_svg, ChartOptions};
use crate::utils::{accuracy, AccuracyMetrics};

/// Estimated parameters and fit quality of the configured model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub spec: SARIMASpec,
    pub mean: f64,
    pub ar: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub converged: bool,
    pub accuracy: Option<AccuracyMetrics>,
    pub ljung_box: Option<LjungBox>,
}

impl ModelSummary {
    fn from_model(model: &SARIMA, series: &TimeSeries, ljung_box_lags: Option<usize>) -> Result<Self> {
        let missing = || ForecastError::FitRequired;
        let spec = model.spec();

        let accuracy = model
            .fitted_values()
            .map(|fitted| accuracy(series.values(), fitted))
            .transpose()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "in-sample accuracy unavailable");
                None
            });

        let ljung_box = model
            .residuals()
            .map(|residuals| ljung_box(residuals, ljung_box_lags, spec.num_coefficients()))
            .transpose()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Ljung-Box test skipped");
                None
            });

        Ok(Self {
            spec,
            mean: model.mean(),
            ar: model.ar_coefficients().to_vec(),
            seasonal_ar: model.seasonal_ar_coefficients().to_vec(),
            ma: model.ma_coefficients().to_vec(),
            seasonal_ma: model.seasonal_ma_coefficients().to_vec(),
            sigma2: model.sigma2().ok_or_else(missing)?,
            log_likelihood: model.log_likelihood().ok_or_else(missing)?,
            aic: model.aic().ok_or_else(missing)?,
            bic: model.bic().ok_or_else(missing)?,
            converged: model.converged().ok_or_else(missing)?,
            accuracy,
            ljung_box,
        })
    }
}

/// One forecast step with its calendar time and bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub point: f64,
    pub standard_error: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub observations: usize,
    /// ACF of the differenced series.
    pub acf: Correlogram,
    /// PACF of the differenced series.
    pub pacf: Correlogram,
    /// Ranked candidate orders, when the search was requested and succeeded.
    pub suggestions: Option<Vec<Candidate>>,
    pub model: ModelSummary,
    pub level: f64,
    pub forecast: Forecast,
    pub rows: Vec<ForecastRow>,
    pub forecast_chart: String,
    pub acf_chart: String,
    pub pacf_chart: String,
}

/// Run the pipeline on the CSV file named in `config.data.path`.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let path = config
        .data
        .path
        .as_deref()
        .ok_or_else(|| ForecastError::Config("no input file given (data.path)".to_string()))?;
    let series = load_csv(path, &config.data)?;
    run_series(&series, config)
}

/// Run the pipeline on an already loaded series.
pub fn run_series(series: &TimeSeries, config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    if series.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    let spec = config.model.spec();
    let level = config.forecast.confidence_level;

    let (acf, pacf) = correlograms(series, spec, config.diagnostics.max_lag)?;
    tracing::info!(
        max_lag = acf.max_lag(),
        significant_acf = ?acf.significant_lags(),
        significant_pacf = ?pacf.significant_lags(),
        "correlograms of the differenced series"
    );

    let suggestions = if config.diagnostics.suggest_orders {
        suggest_orders(series, spec)
    } else {
        None
    };

    let mut model = SARIMA::from_spec(spec);
    if let Some(include) = config.model.include_mean {
        model = model.with_mean(include);
    }
    model.fit(series)?;
    let summary = ModelSummary::from_model(&model, series, config.diagnostics.ljung_box_lags)?;
    tracing::info!(
        model = %spec,
        sigma2 = summary.sigma2,
        aic = summary.aic,
        bic = summary.bic,
        converged = summary.converged,
        "model fitted"
    );

    let forecast = model.predict_with_intervals(config.forecast.horizon, level)?;
    let alignment = ForecastAlignment::for_series(series)?
        .with_offset(config.forecast.calendar_offset()?);
    let timestamps = alignment.timestamps(&forecast)?;
    let rows = forecast_rows(&forecast, &timestamps)?;
    tracing::info!(
        horizon = forecast.horizon(),
        level,
        first = %timestamps.first().map(|t| t.to_rfc3339()).unwrap_or_default(),
        "forecast produced"
    );

    let history = match config.chart.history_window {
        Some(window) => series.tail(window),
        None => series.clone(),
    };
    let chart = &config.chart;
    let forecast_chart = forecast_chart_svg(
        &history,
        &timestamps,
        &forecast,
        &ChartOptions::new(chart.title.clone(), chart.width, chart.height),
    )?;
    let acf_chart = correlogram_svg(
        &acf,
        &ChartOptions::new(format!("ACF of differenced series ({spec})"), chart.width, chart.height / 2),
    )?;
    let pacf_chart = correlogram_svg(
        &pacf,
        &ChartOptions::new(format!("PACF of differenced series ({spec})"), chart.width, chart.height / 2),
    )?;
    tracing::info!("charts rendered");

    Ok(PipelineReport {
        observations: series.len(),
        acf,
        pacf,
        suggestions,
        model: summary,
        level,
        forecast,
        rows,
        forecast_chart,
        acf_chart,
        pacf_chart,
    })
}

/// ACF and PACF of the series after the model's differencing.
///
/// `max_lag` is reduced when the differenced series is too short for it.
fn correlograms(series: &TimeSeries, spec: SARIMASpec, max_lag: usize) -> Result<(Correlogram, Correlogram)> {
    let op = differencing_operator(spec.d, spec.cap_d, spec.s);
    let differenced = apply_operator(series.values(), &op);
    if differenced.len() < 2 {
        return Err(ForecastError::InsufficientData {
            needed: spec.diff_lag() + 2,
            got: series.len(),
        });
    }
    let usable = max_lag.min(differenced.len() - 1);
    if usable < max_lag {
        tracing::warn!(requested = max_lag, usable, "correlogram lag reduced to fit the series");
    }
    Ok((
        Correlogram::acf(&differenced, usable)?,
        Correlogram::pacf(&differenced, usable)?,
    ))
}

fn suggest_orders(series: &TimeSeries, spec: SARIMASpec) -> Option<Vec<Candidate>> {
    let search = OrderSearch::new(OrderSearchConfig::default().with_seasonal_period(spec.s));
    match search.run(series) {
        Ok(ranked) => {
            for candidate in ranked.iter().take(5) {
                tracing::info!(spec = %candidate.spec, score = candidate.score, "suggested order");
            }
            Some(ranked)
        }
        Err(err) => {
            tracing::warn!(error = %err, "order search failed; continuing with configured orders");
            None
        }
    }
}

fn forecast_rows(forecast: &Forecast, timestamps: &[DateTime<Utc>]) -> Result<Vec<ForecastRow>> {
    let intervals = forecast.intervals().ok_or_else(|| {
        ForecastError::ComputationError("forecast carries no intervals".to_string())
    })?;
    if timestamps.len() != forecast.horizon() {
        return Err(ForecastError::DimensionMismatch {
            expected: forecast.horizon(),
            got: timestamps.len(),
        });
    }
    Ok(forecast
        .steps()
        .zip(intervals)
        .zip(timestamps)
        .map(|((step, interval), &timestamp)| ForecastRow {
            index: step.index,
            timestamp,
            point: step.point,
            standard_error: step.standard_error,
            lower: interval.lower,
            upper: interval.upper,
        })
        .collect())
}
