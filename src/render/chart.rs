//! SVG charts for forecasts and correlograms.

use chrono::{DateTime, Utc};
use plotters::prelude::*;

use crate::core::{Forecast, TimeSeries};
use crate::diagnostics::Correlogram;
use crate::error::{ForecastError, Result};

const HISTORY_COLOR: RGBColor = RGBColor(31, 119, 180);
const FORECAST_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Title and pixel size of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Forecast".to_string(),
            width: 1200,
            height: 600,
        }
    }
}

impl ChartOptions {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
        }
    }
}

fn render_error<E: std::fmt::Display>(err: E) -> ForecastError {
    ForecastError::Render(err.to_string())
}

/// Padded `(min, max)` covering every drawn value.
fn y_range<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

/// Draw history, forecast points and the confidence band as an SVG document.
///
/// `timestamps` must hold one entry per forecast step. The band is drawn
/// only when the forecast carries intervals.
pub fn forecast_chart_svg(
    history: &TimeSeries,
    timestamps: &[DateTime<Utc>],
    forecast: &Forecast,
    options: &ChartOptions,
) -> Result<String> {
    if history.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if timestamps.len() != forecast.horizon() {
        return Err(ForecastError::DimensionMismatch {
            expected: forecast.horizon(),
            got: timestamps.len(),
        });
    }

    let (first, last_observed) = match (history.start(), history.end()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(ForecastError::EmptyData),
    };
    let x_end = timestamps.last().copied().unwrap_or(last_observed).max(last_observed);

    let lower = forecast.lower();
    let upper = forecast.upper();
    let (y_min, y_max) = y_range(
        history
            .values()
            .iter()
            .chain(forecast.point())
            .chain(lower.iter().flatten())
            .chain(upper.iter().flatten()),
    );

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(first..x_end, y_min..y_max)
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .x_labels(10)
            .x_label_formatter(&|ts: &DateTime<Utc>| ts.format("%m-%d %H:%M").to_string())
            .x_desc("time (UTC)")
            .y_desc(history.label().unwrap_or("value"))
            .draw()
            .map_err(render_error)?;

        if let (Some(lower), Some(upper)) = (&lower, &upper) {
            let band: Vec<(DateTime<Utc>, f64)> = timestamps
                .iter()
                .copied()
                .zip(upper.iter().copied())
                .chain(timestamps.iter().copied().zip(lower.iter().copied()).rev())
                .collect();
            let label = match forecast.level() {
                Some(level) => format!("{:.0}% interval", level * 100.0),
                None => "interval".to_string(),
            };
            chart
                .draw_series(std::iter::once(Polygon::new(
                    band,
                    FORECAST_COLOR.mix(0.2).filled(),
                )))
                .map_err(render_error)?
                .label(label)
                .legend(|(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 20, y + 5)], FORECAST_COLOR.mix(0.2).filled())
                });
        }

        chart
            .draw_series(LineSeries::new(
                history
                    .timestamps()
                    .iter()
                    .copied()
                    .zip(history.values().iter().copied()),
                HISTORY_COLOR.stroke_width(2),
            ))
            .map_err(render_error)?
            .label("observed")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], HISTORY_COLOR));

        // Joined to the last observation so the two lines connect.
        let last_value = history.values()[history.len() - 1];
        chart
            .draw_series(LineSeries::new(
                std::iter::once((last_observed, last_value)).chain(
                    timestamps
                        .iter()
                        .copied()
                        .zip(forecast.point().iter().copied()),
                ),
                FORECAST_COLOR.stroke_width(2),
            ))
            .map_err(render_error)?
            .label("forecast")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FORECAST_COLOR));

        chart
            .draw_series(
                timestamps
                    .iter()
                    .copied()
                    .zip(forecast.point().iter().copied())
                    .map(|point| Circle::new(point, 3, FORECAST_COLOR.filled())),
            )
            .map_err(render_error)?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
    }
    Ok(svg)
}

/// Draw correlation bars by lag with the white-noise bounds.
pub fn correlogram_svg(correlogram: &Correlogram, options: &ChartOptions) -> Result<String> {
    if correlogram.values.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    let max_lag = correlogram.max_lag() as f64;
    let extent = correlogram
        .values
        .iter()
        .map(|v| v.abs())
        .fold(correlogram.bound, f64::max)
        .max(1.0);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5..max_lag + 0.5, -extent..extent)
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("lag")
            .y_desc(correlogram.kind.label())
            .draw()
            .map_err(render_error)?;

        chart
            .draw_series(correlogram.values.iter().enumerate().map(|(lag, &v)| {
                let x = lag as f64;
                Rectangle::new([(x - 0.3, 0.0), (x + 0.3, v)], HISTORY_COLOR.filled())
            }))
            .map_err(render_error)?;

        for bound in [correlogram.bound, -correlogram.bound] {
            chart
                .draw_series(LineSeries::new(
                    [(-0.5, bound), (max_lag + 0.5, bound)],
                    FORECAST_COLOR.stroke_width(1),
                ))
                .map_err(render_error)?;
        }
        chart
            .draw_series(LineSeries::new([(-0.5, 0.0), (max_lag + 0.5, 0.0)], BLACK))
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
    }
    Ok(svg)
}
