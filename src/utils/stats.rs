//! Distribution helpers and sample moments.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Quantile function of the standard normal distribution.
///
/// Returns negative infinity for `p <= 0`, positive infinity for `p >= 1`
/// and NaN for NaN input.
///
/// # Example
/// ```
/// use follower_forecast::utils::quantile_normal;
///
/// // 95% two-sided confidence -> z ~ 1.96
/// let z = quantile_normal(0.975);
/// assert!((z - 1.959964).abs() < 1e-5);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Upper-tail probability of a chi-squared variable with `df` degrees of freedom.
pub fn chi_squared_sf(statistic: f64, df: usize) -> f64 {
    if df == 0 || !statistic.is_finite() {
        return f64::NAN;
    }
    match ChiSquared::new(df as f64) {
        Ok(dist) => 1.0 - dist.cdf(statistic.max(0.0)),
        Err(_) => f64::NAN,
    }
}

/// Arithmetic mean, NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    match values.len() {
        0 => f64::NAN,
        n => values.iter().sum::<f64>() / n as f64,
    }
}

/// Sample variance (denominator `n - 1`), NaN below two values.
pub fn variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let centre = mean(values);
    values.iter().map(|v| (v - centre) * (v - centre)).sum::<f64>() / (n - 1) as f64
}
