//! Sample autocorrelation and partial autocorrelation.

use crate::error::{ForecastError, Result};
use crate::utils::stats::mean;

/// Sample autocorrelations for lags `0..=max_lag`.
///
/// Uses the biased estimator (denominator `n`), so the values form a
/// positive semi-definite sequence. A constant series yields 1 at lag 0 and
/// 0 elsewhere.
pub fn acf(values: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if max_lag >= values.len() {
        return Err(ForecastError::InsufficientData {
            needed: max_lag + 1,
            got: values.len(),
        });
    }

    let m = mean(values);
    let centered: Vec<f64> = values.iter().map(|v| v - m).collect();
    let denominator: f64 = centered.iter().map(|x| x * x).sum();

    let mut out = Vec::with_capacity(max_lag + 1);
    out.push(1.0);
    for lag in 1..=max_lag {
        if denominator < 1e-12 {
            out.push(0.0);
            continue;
        }
        let numerator: f64 = centered[lag..]
            .iter()
            .zip(&centered)
            .map(|(a, b)| a * b)
            .sum();
        out.push(numerator / denominator);
    }
    Ok(out)
}

/// Partial autocorrelations for lags `0..=max_lag` via Durbin-Levinson.
///
/// Lag 0 is 1 by convention. If the recursion degenerates (perfectly
/// predictable series), remaining lags are 0.
pub fn pacf(values: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let rho = acf(values, max_lag)?;

    let mut out = vec![1.0];
    if max_lag == 0 {
        return Ok(out);
    }

    let mut phi = vec![0.0; max_lag + 1];
    let mut prev = vec![0.0; max_lag + 1];
    let mut v: f64 = 1.0;

    for k in 1..=max_lag {
        let num = rho[k] - (1..k).map(|j| prev[j] * rho[k - j]).sum::<f64>();
        if v.abs() < 1e-12 {
            out.extend(std::iter::repeat(0.0).take(max_lag + 1 - k));
            break;
        }
        let phi_kk = num / v;
        phi[k] = phi_kk;
        for j in 1..k {
            phi[j] = prev[j] - phi_kk * prev[k - j];
        }
        v *= 1.0 - phi_kk * phi_kk;
        out.push(phi_kk);
        prev[..=k].copy_from_slice(&phi[..=k]);
    }
    Ok(out)
}

/// Which correlation function a [`Correlogram`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationKind {
    Acf,
    Pacf,
}

impl CorrelationKind {
    pub fn label(&self) -> &'static str {
        match self {
            CorrelationKind::Acf => "Autocorrelation",
            CorrelationKind::Pacf => "Partial autocorrelation",
        }
    }
}

/// Correlation values by lag with the approximate 95 % white-noise bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlogram {
    pub kind: CorrelationKind,
    /// Values for lags `0..=max_lag`.
    pub values: Vec<f64>,
    /// `1.96 / sqrt(n)`.
    pub bound: f64,
}

impl Correlogram {
    pub fn acf(values: &[f64], max_lag: usize) -> Result<Self> {
        Ok(Self {
            kind: CorrelationKind::Acf,
            values: acf(values, max_lag)?,
            bound: white_noise_bound(values.len()),
        })
    }

    pub fn pacf(values: &[f64], max_lag: usize) -> Result<Self> {
        Ok(Self {
            kind: CorrelationKind::Pacf,
            values: pacf(values, max_lag)?,
            bound: white_noise_bound(values.len()),
        })
    }

    pub fn max_lag(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// Lags (excluding 0) whose magnitude exceeds the bound.
    pub fn significant_lags(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, v)| v.abs() > self.bound)
            .map(|(lag, _)| lag)
            .collect()
    }
}

fn white_noise_bound(n: usize) -> f64 {
    1.96 / (n as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    #[test]
    fn acf_lag_zero_is_one() {
        let r = acf(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
        assert_relative_eq!(r[0], 1.0);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn acf_known_values() {
        // Centered [-2, -1, 0, 1, 2], denominator 10.
        let r = acf(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
        assert_relative_eq!(r[1], 0.4, epsilon = 1e-12);
        assert_relative_eq!(r[2], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn acf_peaks_at_seasonal_lag() {
        let values: Vec<f64> = (0..240)
            .map(|i| (2.0 * PI * i as f64 / 24.0).sin())
            .collect();
        let r = acf(&values, 30).unwrap();
        assert!(r[24] > 0.8);
        assert!(r[12] < -0.8);
    }

    #[test]
    fn constant_series_has_zero_autocorrelation() {
        let r = acf(&[3.0; 10], 3).unwrap();
        assert_eq!(r, vec![1.0, 0.0, 0.0, 0.0]);
        let p = pacf(&[3.0; 10], 3).unwrap();
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn pacf_cuts_off_after_ar1() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut values = vec![0.0];
        for i in 1..2000 {
            let shock: f64 = rng.gen_range(-0.5..0.5);
            values.push(0.6 * values[i - 1] + shock);
        }
        let p = pacf(&values, 5).unwrap();
        let r = acf(&values, 5).unwrap();
        assert_relative_eq!(p[1], r[1], epsilon = 1e-12);
        assert!(p[1] > 0.4);
        for lag in 2..=5 {
            assert!(p[lag].abs() < 0.15, "lag {lag}: {}", p[lag]);
        }
    }

    #[test]
    fn rejects_too_many_lags() {
        assert!(matches!(
            acf(&[1.0, 2.0, 3.0], 3),
            Err(ForecastError::InsufficientData { needed: 4, got: 3 })
        ));
        assert!(matches!(acf(&[], 0), Err(ForecastError::EmptyData)));
    }

    #[test]
    fn correlogram_flags_significant_lags() {
        let values: Vec<f64> = (0..100)
            .map(|i| (2.0 * PI * i as f64 / 10.0).sin())
            .collect();
        let c = Correlogram::acf(&values, 20).unwrap();
        assert_relative_eq!(c.bound, 0.196, epsilon = 1e-12);
        assert_eq!(c.max_lag(), 20);
        assert!(c.significant_lags().contains(&10));
        assert!(!c.significant_lags().contains(&0));
        assert_eq!(c.kind.label(), "Autocorrelation");
    }
}
