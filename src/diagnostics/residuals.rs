//! Portmanteau test for leftover autocorrelation in model residuals.

use crate::diagnostics::autocorrelation::acf;
use crate::error::{ForecastError, Result};
use crate::utils::stats::chi_squared_sf;

/// Result of a Ljung-Box test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LjungBox {
    pub statistic: f64,
    pub lags: usize,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
}

impl LjungBox {
    /// Residuals look like white noise at significance `alpha`.
    pub fn is_white_noise(&self, alpha: f64) -> bool {
        self.p_value > alpha
    }
}

/// Ljung-Box Q statistic over the first `lags` autocorrelations.
///
/// `lags` defaults to `min(10, n / 5)`. Degrees of freedom are reduced by
/// `fitted_params` but never below 1.
pub fn ljung_box(residuals: &[f64], lags: Option<usize>, fitted_params: usize) -> Result<LjungBox> {
    let n = residuals.len();
    if n < 3 {
        return Err(ForecastError::InsufficientData { needed: 3, got: n });
    }
    let lags = lags.unwrap_or_else(|| (n / 5).clamp(1, 10));
    if lags == 0 {
        return Err(ForecastError::InvalidArgument(
            "Ljung-Box needs at least one lag".to_string(),
        ));
    }

    let rho = acf(residuals, lags)?;
    let nf = n as f64;
    let statistic = nf
        * (nf + 2.0)
        * (1..=lags)
            .map(|k| rho[k] * rho[k] / (nf - k as f64))
            .sum::<f64>();

    let degrees_of_freedom = lags.saturating_sub(fitted_params).max(1);
    Ok(LjungBox {
        statistic,
        lags,
        degrees_of_freedom,
        p_value: chi_squared_sf(statistic, degrees_of_freedom),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn white_noise(n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(99);
        (0..n).map(|_| rng.gen_range(-0.5..0.5)).collect()
    }

    #[test]
    fn white_noise_passes() {
        let result = ljung_box(&white_noise(500), Some(10), 0).unwrap();
        assert_eq!(result.lags, 10);
        assert_eq!(result.degrees_of_freedom, 10);
        assert!(result.is_white_noise(0.01), "p = {}", result.p_value);
    }

    #[test]
    fn autocorrelated_residuals_fail() {
        let eps = white_noise(500);
        let mut values = vec![0.0];
        for t in 1..500 {
            values.push(0.8 * values[t - 1] + eps[t]);
        }
        let result = ljung_box(&values, None, 0).unwrap();
        assert_eq!(result.lags, 10);
        assert!(result.p_value < 1e-6);
        assert!(!result.is_white_noise(0.05));
    }

    #[test]
    fn fitted_params_reduce_degrees_of_freedom() {
        let r = ljung_box(&white_noise(100), Some(6), 4).unwrap();
        assert_eq!(r.degrees_of_freedom, 2);
        let r = ljung_box(&white_noise(100), Some(3), 5).unwrap();
        assert_eq!(r.degrees_of_freedom, 1);
    }

    #[test]
    fn short_input() {
        assert!(matches!(
            ljung_box(&[1.0, 2.0], None, 0),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        ));
        assert!(matches!(
            ljung_box(&[1.0, 2.0, 3.0, 4.0], Some(0), 0),
            Err(ForecastError::InvalidArgument(_))
        ));
    }
}
