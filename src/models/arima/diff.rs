//! Differencing operators and lag-polynomial helpers for seasonal ARIMA.
//!
//! Lag polynomials are stored as full coefficient vectors
//! `[c0, c1, c2, ...]` meaning `c0 + c1·B + c2·B² + ...`.

use crate::utils::stats::variance;

/// Apply `d` rounds of first differencing.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply `d` rounds of lag-`period` differencing.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = (period..result.len())
            .map(|t| result[t] - result[t - period])
            .collect();
    }
    result
}

/// Multiply two lag polynomials.
pub fn lag_poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// The combined operator `(1 - B)^d (1 - B^s)^D`.
pub fn differencing_operator(d: usize, cap_d: usize, period: usize) -> Vec<f64> {
    let mut op = vec![1.0];
    for _ in 0..d {
        op = lag_poly_mul(&op, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..cap_d {
            op = lag_poly_mul(&op, &seasonal);
        }
    }
    op
}

/// Apply a lag polynomial to a series: `w_t = Σ_k op[k]·y_{t-k}`.
///
/// The output starts at the first `t` with a full lag window, so it is
/// `op.len() - 1` shorter than the input.
pub fn apply_operator(series: &[f64], op: &[f64]) -> Vec<f64> {
    let order = op.len().saturating_sub(1);
    if op.is_empty() || series.len() <= order {
        return Vec::new();
    }
    (order..series.len())
        .map(|t| op.iter().enumerate().map(|(k, c)| c * series[t - k]).sum())
        .collect()
}

/// Undo a differencing operator for future values.
///
/// `differenced` holds forecasts on the differenced scale; `history` is the
/// observed series on the original scale. Each forecast is recovered from
/// `y_t = w_t - Σ_{k≥1} op[k]·y_{t-k}`.
pub fn integrate(differenced: &[f64], history: &[f64], op: &[f64]) -> Vec<f64> {
    let mut extended = history.to_vec();
    for &w in differenced {
        let t = extended.len();
        let carried: f64 = op
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(k, _)| *k <= t)
            .map(|(k, c)| c * extended[t - k])
            .sum();
        extended.push(w - carried);
    }
    extended.split_off(history.len())
}

/// Suggest a first-differencing order (0, 1 or 2) from variance ratios.
pub fn suggest_differencing(series: &[f64]) -> usize {
    if series.len() < 4 {
        return 0;
    }
    let var_0 = variance(series);
    let var_1 = variance(&difference(series, 1));
    if !(var_0 > 0.0) || !(var_1 / var_0 < 0.9) {
        return 0;
    }
    let var_2 = variance(&difference(series, 2));
    if var_2 / var_1 < 0.9 && var_2 < var_0 {
        2
    } else {
        1
    }
}

/// Suggest a seasonal differencing order (0 or 1).
///
/// Seasonal differencing is suggested when it removes at least 30 % of the
/// variance of the series.
pub fn suggest_seasonal_differencing(series: &[f64], period: usize) -> usize {
    if period < 2 || series.len() < 2 * period {
        return 0;
    }
    let var_0 = variance(series);
    let var_s = variance(&seasonal_difference(series, 1, period));
    if var_0 > 0.0 && var_s < 0.7 * var_0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn difference_orders() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 0), series);
        assert_eq!(difference(&series, 1), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(difference(&series, 2), vec![1.0, 1.0, 1.0]);
        assert!(difference(&[], 1).is_empty());
        assert!(difference(&[4.0], 1).is_empty());
    }

    #[test]
    fn seasonal_difference_removes_daily_cycle() {
        let day: Vec<f64> = (0..24).map(|h| (h as f64 * 0.5).sin() * 10.0).collect();
        let series: Vec<f64> = day.iter().chain(day.iter()).chain(day.iter()).copied().collect();
        let result = seasonal_difference(&series, 1, 24);
        assert_eq!(result.len(), 48);
        assert!(result.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn seasonal_difference_quarterly() {
        let series = vec![100.0, 120.0, 80.0, 90.0, 110.0, 130.0, 90.0, 100.0];
        assert_eq!(
            seasonal_difference(&series, 1, 4),
            vec![10.0, 10.0, 10.0, 10.0]
        );
        assert_eq!(seasonal_difference(&series, 0, 4), series);
        assert!(seasonal_difference(&series, 2, 4).is_empty());
    }

    #[test]
    fn operator_matches_sequential_differencing() {
        let series: Vec<f64> = (0..40).map(|i| (i as f64).powf(1.3) + (i % 6) as f64).collect();
        let op = differencing_operator(1, 1, 6);
        let direct = apply_operator(&series, &op);
        let sequential = seasonal_difference(&difference(&series, 1), 1, 6);
        assert_eq!(direct.len(), sequential.len());
        for (a, b) in direct.iter().zip(&sequential) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn operator_coefficients() {
        assert_eq!(differencing_operator(0, 0, 24), vec![1.0]);
        assert_eq!(differencing_operator(2, 0, 0), vec![1.0, -2.0, 1.0]);
        let op = differencing_operator(1, 1, 3);
        assert_eq!(op, vec![1.0, -1.0, 0.0, -1.0, 1.0]);
    }

    #[test]
    fn integrate_continues_last_value() {
        let history = vec![10.0, 12.0, 15.0, 19.0, 24.0];
        let op = differencing_operator(1, 0, 0);
        let integrated = integrate(&[6.0, 7.0], &history, &op);
        assert_relative_eq!(integrated[0], 30.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 37.0, epsilon = 1e-10);
    }

    #[test]
    fn integrate_seasonal_repeats_last_cycle() {
        let history = vec![1.0, 5.0, 3.0, 2.0, 6.0, 4.0];
        let op = differencing_operator(0, 1, 3);
        let integrated = integrate(&[0.0, 0.0, 0.0, 1.0], &history, &op);
        assert_eq!(integrated, vec![2.0, 6.0, 4.0, 3.0]);
    }

    #[test]
    fn suggests_differencing_for_trend_only() {
        let stationary = vec![1.0, 0.5, 1.2, 0.8, 1.1, 0.9, 1.0, 1.1];
        assert_eq!(suggest_differencing(&stationary), 0);
        let trend: Vec<f64> = (0..30).map(|i| 10.0 + 2.0 * i as f64).collect();
        assert!(suggest_differencing(&trend) >= 1);
    }

    #[test]
    fn suggests_seasonal_differencing_for_strong_cycle() {
        let cyclic: Vec<f64> = (0..96)
            .map(|i| 50.0 + 20.0 * (2.0 * std::f64::consts::PI * i as f64 / 24.0).sin())
            .collect();
        assert_eq!(suggest_seasonal_differencing(&cyclic, 24), 1);
        assert_eq!(suggest_seasonal_differencing(&cyclic[..30], 24), 0);
    }
}
