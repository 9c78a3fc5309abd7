//! CSV loading for follower-activity exports.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::config::DataConfig;
use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a timestamp as RFC 3339, or as a naive `YYYY-MM-DD HH:MM[:SS]`
/// interpreted in UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ForecastError::TimestampError(format!("unrecognised timestamp '{raw}'")))
}

/// Load the configured value column from a CSV file.
pub fn load_csv(path: &Path, config: &DataConfig) -> Result<TimeSeries> {
    let file = File::open(path).map_err(|e| {
        ForecastError::DataLoad(format!("failed to open '{}': {e}", path.display()))
    })?;
    let series = read_series(BufReader::new(file), config)?;
    tracing::info!(
        path = %path.display(),
        column = %config.value_column,
        observations = series.len(),
        "loaded series"
    );
    Ok(series)
}

/// Read a series from any CSV source with a header row.
///
/// Values must be finite and non-negative. When no timestamp column is
/// configured, timestamps are `start + i * frequency`.
pub fn read_series<R: Read>(reader: R, config: &DataConfig) -> Result<TimeSeries> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = reader.headers()?.clone();
    let value_idx = column_index(&headers, &config.value_column)?;
    let timestamp_idx = config
        .timestamp_column
        .as_deref()
        .map(|name| column_index(&headers, name))
        .transpose()?;

    let mut values = Vec::new();
    let mut timestamps = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result?;

        let raw = record.get(value_idx).unwrap_or("");
        let value = parse_value(raw, line)?;
        values.push(value);

        if let Some(ts_idx) = timestamp_idx {
            let raw_ts = record.get(ts_idx).unwrap_or("");
            let ts = parse_timestamp(raw_ts).map_err(|e| match e {
                ForecastError::TimestampError(msg) => {
                    ForecastError::TimestampError(format!("line {line}: {msg}"))
                }
                other => other,
            })?;
            timestamps.push(ts);
        }
    }

    if values.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    let series = if timestamp_idx.is_some() {
        TimeSeries::univariate(timestamps, values)?
    } else {
        TimeSeries::regular(config.start_time()?, config.frequency()?, values)?
    };
    Ok(series.with_label(config.value_column.clone()))
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        ForecastError::DataLoad(format!(
            "column '{name}' not found (available: {})",
            headers.iter().collect::<Vec<_>>().join(", ")
        ))
    })
}

fn parse_value(raw: &str, line: usize) -> Result<f64> {
    if raw.is_empty() {
        return Err(ForecastError::MissingValues);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| ForecastError::DataLoad(format!("line {line}: '{raw}' is not a number")))?;
    if !value.is_finite() {
        return Err(ForecastError::MissingValues);
    }
    if value < 0.0 {
        return Err(ForecastError::InvalidArgument(format!(
            "line {line}: follower counts cannot be negative, got {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn config() -> DataConfig {
        DataConfig::default()
    }

    #[test]
    fn reads_value_column_with_synthetic_hours() {
        let csv = "hour,active_followers\n0,120\n1,95\n2,80\n";
        let series = read_series(csv.as_bytes(), &config()).unwrap();

        assert_eq!(series.values(), &[120.0, 95.0, 80.0]);
        assert_eq!(series.label(), Some("active_followers"));
        assert_eq!(
            series.start(),
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(series.frequency(), Some(Duration::hours(1)));
    }

    #[test]
    fn reads_timestamp_column() {
        let csv = "\
time,active_followers
2024-03-01 00:00,10
2024-03-01T01:00:00Z,12
2024-03-01 02:00:00,11
";
        let cfg = DataConfig {
            timestamp_column: Some("time".to_string()),
            ..config()
        };
        let series = read_series(csv.as_bytes(), &cfg).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(
            series.end(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap())
        );
        assert!(series.is_regular());
    }

    #[test]
    fn custom_column_and_whitespace() {
        let csv = "a, b\n1, 2\n3, 4\n";
        let cfg = DataConfig {
            value_column: "b".to_string(),
            ..config()
        };
        let series = read_series(csv.as_bytes(), &cfg).unwrap();
        assert_eq!(series.values(), &[2.0, 4.0]);
    }

    #[test]
    fn missing_column() {
        let err = read_series("x,y\n1,2\n".as_bytes(), &config()).unwrap_err();
        assert!(matches!(err, ForecastError::DataLoad(msg) if msg.contains("active_followers")));
    }

    #[test]
    fn header_only_is_empty() {
        let err = read_series("active_followers\n".as_bytes(), &config()).unwrap_err();
        assert_eq!(err, ForecastError::EmptyData);
    }

    #[test]
    fn rejects_bad_values() {
        let err = read_series("active_followers\n1\nabc\n".as_bytes(), &config()).unwrap_err();
        assert!(matches!(err, ForecastError::DataLoad(msg) if msg.contains("line 3")));

        let err = read_series("active_followers\n1\nNaN\n".as_bytes(), &config()).unwrap_err();
        assert_eq!(err, ForecastError::MissingValues);

        let err = read_series("active_followers\n1\n-4\n".as_bytes(), &config()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_unordered_timestamps() {
        let csv = "time,active_followers\n2024-01-01 02:00,1\n2024-01-01 01:00,2\n";
        let cfg = DataConfig {
            timestamp_column: Some("time".to_string()),
            ..config()
        };
        assert!(matches!(
            read_series(csv.as_bytes(), &cfg),
            Err(ForecastError::TimestampError(_))
        ));
    }

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2021, 6, 5, 13, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2021-06-05T13:30:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-06-05T15:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-06-05 13:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp(" 2021-06-05 13:30 ").unwrap(), expected);
        assert!(parse_timestamp("05/06/2021").is_err());
    }

    #[test]
    fn missing_file() {
        let err = load_csv(Path::new("/definitely/not/here.csv"), &config()).unwrap_err();
        assert!(matches!(err, ForecastError::DataLoad(_)));
    }
}
