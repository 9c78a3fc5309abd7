//! # follower-forecast
//!
//! Command-line front end: forecast hourly follower activity from a CSV
//! export and write the chart.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use follower_forecast::config::PipelineConfig;
use follower_forecast::pipeline::{self, PipelineReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "follower-forecast")]
#[command(about = "Forecast hourly follower activity with seasonal ARIMA", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input CSV file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Column holding the follower counts
    #[arg(short, long)]
    column: Option<String>,

    /// Number of hours to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Confidence level of the bands, strictly between 0 and 1
    #[arg(long)]
    level: Option<f64>,

    /// Non-seasonal order as p,d,q
    #[arg(long, value_parser = parse_orders::<3>)]
    order: Option<[usize; 3]>,

    /// Seasonal order as P,D,Q,s
    #[arg(long, value_parser = parse_orders::<4>)]
    seasonal_order: Option<[usize; 4]>,

    /// Rank candidate orders and log the result
    #[arg(long)]
    suggest: bool,

    /// Write the forecast chart (SVG) here
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Write the ACF chart here; the PACF goes next to it with a `_pacf` suffix
    #[arg(long)]
    correlogram: Option<PathBuf>,

    /// Write the forecast table as CSV here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

fn parse_orders<const N: usize>(raw: &str) -> std::result::Result<[usize; N], String> {
    let parts = raw
        .split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("'{raw}': {e}"))?;
    parts
        .try_into()
        .map_err(|parts: Vec<usize>| format!("expected {N} comma-separated values, got {}", parts.len()))
}

impl Cli {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(input) = &self.input {
            config.data.path = Some(input.clone());
        }
        if let Some(column) = &self.column {
            config.data.value_column = column.clone();
        }
        if let Some(horizon) = self.horizon {
            config.forecast.horizon = horizon;
        }
        if let Some(level) = self.level {
            config.forecast.confidence_level = level;
        }
        if let Some(order) = self.order {
            config.model.order = order;
        }
        if let Some(seasonal) = self.seasonal_order {
            config.model.seasonal_order = seasonal;
        }
        if self.suggest {
            config.diagnostics.suggest_orders = true;
        }
    }

    fn default_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = PipelineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);
    config.validate().context("invalid options")?;

    let report = pipeline::run(&config)?;
    print_report(&report);

    if let Some(path) = &cli.chart {
        write(path, &report.forecast_chart)?;
    }
    if let Some(path) = &cli.correlogram {
        write(path, &report.acf_chart)?;
        write(&pacf_path(path), &report.pacf_chart)?;
    }
    if let Some(path) = &cli.output {
        write_rows(path, &report)?;
    }
    Ok(())
}

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote chart");
    Ok(())
}

fn pacf_path(acf_path: &Path) -> PathBuf {
    let stem = acf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "correlogram".to_string());
    let ext = acf_path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "svg".to_string());
    acf_path.with_file_name(format!("{stem}_pacf.{ext}"))
}

fn write_rows(path: &Path, report: &PipelineReport) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["timestamp", "point", "standard_error", "lower", "upper"])?;
    for row in &report.rows {
        writer.write_record([
            row.timestamp.to_rfc3339(),
            format!("{:.4}", row.point),
            format!("{:.4}", row.standard_error),
            format!("{:.4}", row.lower),
            format!("{:.4}", row.upper),
        ])?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = report.rows.len(), "wrote forecast table");
    Ok(())
}

fn print_report(report: &PipelineReport) {
    let model = &report.model;
    println!("{} fitted to {} observations", model.spec, report.observations);
    if !model.ar.is_empty() {
        println!("  ar:          {:?}", model.ar);
    }
    if !model.ma.is_empty() {
        println!("  ma:          {:?}", model.ma);
    }
    if !model.seasonal_ar.is_empty() {
        println!("  seasonal ar: {:?}", model.seasonal_ar);
    }
    if !model.seasonal_ma.is_empty() {
        println!("  seasonal ma: {:?}", model.seasonal_ma);
    }
    if model.mean != 0.0 {
        println!("  mean:        {:.4}", model.mean);
    }
    println!(
        "  sigma2 {:.4}  loglik {:.2}  AIC {:.2}  BIC {:.2}{}",
        model.sigma2,
        model.log_likelihood,
        model.aic,
        model.bic,
        if model.converged { "" } else { "  (not converged)" }
    );
    if let Some(acc) = &model.accuracy {
        let mape = acc
            .mape
            .map(|m| format!("{m:.2}%"))
            .unwrap_or_else(|| "n/a".to_string());
        println!("  in-sample MAE {:.3}  RMSE {:.3}  MAPE {}", acc.mae, acc.rmse, mape);
    }
    if let Some(lb) = &model.ljung_box {
        println!(
            "  Ljung-Box Q({}) = {:.2}, df {}, p = {:.4}",
            lb.lags, lb.statistic, lb.degrees_of_freedom, lb.p_value
        );
    }
    if let Some(suggestions) = &report.suggestions {
        println!("suggested orders:");
        for candidate in suggestions.iter().take(5) {
            println!("  {:<28} {:.2}", candidate.spec.to_string(), candidate.score);
        }
    }

    println!();
    println!(
        "{:<26} {:>12} {:>10} {:>12} {:>12}",
        "timestamp",
        "forecast",
        "se",
        format!("lo {:.0}%", report.level * 100.0),
        format!("hi {:.0}%", report.level * 100.0)
    );
    for row in &report.rows {
        println!(
            "{:<26} {:>12.2} {:>10.2} {:>12.2} {:>12.2}",
            row.timestamp.format("%Y-%m-%d %H:%M UTC").to_string(),
            row.point,
            row.standard_error,
            row.lower,
            row.upper
        );
    }
}
