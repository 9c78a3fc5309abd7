//! Seasonal ARIMA model estimated by conditional sum of squares.

use std::fmt;

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{apply_operator, differencing_operator, integrate, lag_poly_mul};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, SimplexConfig};
use crate::utils::stats::{mean, variance};

/// Every AR and MA coefficient is kept inside `(-BOUND, BOUND)`.
const COEFFICIENT_BOUND: f64 = 0.99;
/// Smallest innovation variance used in the likelihood; an exact fit
/// would otherwise give an infinite log-likelihood.
const LIKELIHOOD_VARIANCE_FLOOR: f64 = 1e-12;

/// Orders of a seasonal ARIMA(p, d, q)(P, D, Q)\[s\] model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    /// Seasonal AR order (P)
    pub cap_p: usize,
    /// Seasonal differencing order (D)
    pub cap_d: usize,
    /// Seasonal MA order (Q)
    pub cap_q: usize,
    /// Seasonal period (s)
    pub s: usize,
}

impl SARIMASpec {
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }

    /// A non-seasonal ARIMA(p, d, q).
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::new(p, d, q, 0, 0, 0, 0)
    }

    /// Whether any seasonal term is active.
    pub fn is_seasonal(&self) -> bool {
        self.s > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// Number of estimated AR and MA coefficients.
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.cap_p + self.cap_q
    }

    /// Highest lag of the expanded AR polynomial.
    pub fn ar_lag(&self) -> usize {
        self.p + self.cap_p * self.s
    }

    /// Highest lag of the expanded MA polynomial.
    pub fn ma_lag(&self) -> usize {
        self.q + self.cap_q * self.s
    }

    /// Observations consumed by differencing.
    pub fn diff_lag(&self) -> usize {
        self.d + self.cap_d * self.s
    }

    /// Smallest series length this specification can be fitted to.
    pub fn min_observations(&self) -> usize {
        self.diff_lag() + self.ar_lag().max(self.ma_lag()) + self.num_coefficients() + 2
    }

    /// Check that seasonal orders come with a usable period.
    pub fn validate(&self) -> Result<()> {
        let has_seasonal_terms = self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0;
        if has_seasonal_terms && self.s < 2 {
            return Err(ForecastError::InvalidArgument(format!(
                "seasonal orders ({}, {}, {}) need a seasonal period of at least 2, got {}",
                self.cap_p, self.cap_d, self.cap_q, self.s
            )));
        }
        Ok(())
    }
}

impl Default for SARIMASpec {
    /// Hourly data with a daily cycle: (1, 1, 1)(1, 1, 1)\[24\].
    fn default() -> Self {
        Self::new(1, 1, 1, 1, 1, 1, 24)
    }
}

impl fmt::Display for SARIMASpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_seasonal() {
            write!(
                f,
                "SARIMA({},{},{})({},{},{})[{}]",
                self.p, self.d, self.q, self.cap_p, self.cap_d, self.cap_q, self.s
            )
        } else {
            write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
        }
    }
}

/// Estimated state of a fitted model.
#[derive(Debug, Clone)]
struct FitState {
    history: Vec<f64>,
    differenced: Vec<f64>,
    /// One-step errors on the differenced scale, zero before the AR lag.
    innovations: Vec<f64>,
    residuals: Vec<f64>,
    fitted: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    converged: bool,
}

/// Seasonal ARIMA forecasting model.
///
/// The series is differenced with `(1 - B)^d (1 - B^s)^D`, and the result
/// follows `φ(B) Φ(B^s) (w_t - μ) = θ(B) Θ(B^s) e_t`. Coefficients are
/// chosen by minimising the conditional sum of squared one-step errors.
/// Forecast standard errors come from the ψ-weights of the fully expanded
/// model, so they grow with the horizon and reflect both differencing
/// operators.
#[derive(Debug, Clone)]
pub struct SARIMA {
    spec: SARIMASpec,
    include_mean: Option<bool>,
    mean: f64,
    ar: Vec<f64>,
    seasonal_ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ma: Vec<f64>,
    state: Option<FitState>,
}

impl SARIMA {
    /// Create an unfitted SARIMA(p, d, q)(P, D, Q)\[s\].
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self::from_spec(SARIMASpec::new(p, d, q, cap_p, cap_d, cap_q, s))
    }

    /// Create an unfitted non-seasonal ARIMA(p, d, q).
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::from_spec(SARIMASpec::arima(p, d, q))
    }

    pub fn from_spec(spec: SARIMASpec) -> Self {
        Self {
            spec,
            include_mean: None,
            mean: 0.0,
            ar: Vec::new(),
            seasonal_ar: Vec::new(),
            ma: Vec::new(),
            seasonal_ma: Vec::new(),
            state: None,
        }
    }

    /// Force a mean term on or off. By default a mean is estimated only
    /// when no differencing is applied.
    pub fn with_mean(mut self, include: bool) -> Self {
        self.include_mean = Some(include);
        self
    }

    pub fn spec(&self) -> SARIMASpec {
        self.spec
    }

    /// Mean of the differenced series (zero when no mean is estimated).
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma
    }

    /// Innovation variance.
    pub fn sigma2(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.sigma2)
    }

    /// Gaussian conditional log-likelihood.
    pub fn log_likelihood(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.log_likelihood)
    }

    pub fn aic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.aic)
    }

    pub fn bic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.bic)
    }

    /// Whether the parameter search met its tolerance.
    pub fn converged(&self) -> Option<bool> {
        self.state.as_ref().map(|s| s.converged)
    }

    /// Full AR lag polynomial `φ(B) Φ(B^s)`.
    fn ar_polynomial(&self) -> Vec<f64> {
        lag_poly_mul(
            &seasonal_poly(&self.ar, 1, -1.0),
            &seasonal_poly(&self.seasonal_ar, self.spec.s, -1.0),
        )
    }

    /// Full MA lag polynomial `θ(B) Θ(B^s)`.
    fn ma_polynomial(&self) -> Vec<f64> {
        lag_poly_mul(
            &seasonal_poly(&self.ma, 1, 1.0),
            &seasonal_poly(&self.seasonal_ma, self.spec.s, 1.0),
        )
    }

    /// First `count` ψ-weights of the model on the original scale.
    ///
    /// The h-step forecast error variance is `σ² Σ_{j<h} ψ_j²`.
    pub fn psi_weights(&self, count: usize) -> Vec<f64> {
        let op = differencing_operator(self.spec.d, self.spec.cap_d, self.spec.s);
        let full_ar = lag_poly_mul(&self.ar_polynomial(), &op);
        let ma = self.ma_polynomial();

        let mut psi: Vec<f64> = Vec::with_capacity(count);
        for j in 0..count {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut value = ma.get(j).copied().unwrap_or(0.0);
            for k in 1..=j.min(full_ar.len() - 1) {
                value -= full_ar[k] * psi[j - k];
            }
            psi.push(value);
        }
        psi
    }

    fn set_parameters(&mut self, params: &[f64], include_mean: bool) {
        let (mean, ar, sar, ma, sma) = split_params(&self.spec, params, include_mean);
        self.mean = mean;
        self.ar = ar.to_vec();
        self.seasonal_ar = sar.to_vec();
        self.ma = ma.to_vec();
        self.seasonal_ma = sma.to_vec();
    }
}

impl Default for SARIMA {
    fn default() -> Self {
        Self::from_spec(SARIMASpec::default())
    }
}

/// `1 + sign·c_1·B^s + sign·c_2·B^{2s} + ...`
fn seasonal_poly(coefficients: &[f64], s: usize, sign: f64) -> Vec<f64> {
    let s = s.max(1);
    let mut poly = vec![0.0; coefficients.len() * s + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * s] = sign * c;
    }
    poly
}

/// Non-zero terms of a lag polynomial, excluding lag 0.
fn sparse_terms(poly: &[f64]) -> Vec<(usize, f64)> {
    poly.iter()
        .enumerate()
        .skip(1)
        .filter(|(_, c)| **c != 0.0)
        .map(|(k, c)| (k, *c))
        .collect()
}

/// Parameter vector layout: `[μ?, φ.., Φ.., θ.., Θ..]`.
fn split_params<'a>(
    spec: &SARIMASpec,
    params: &'a [f64],
    include_mean: bool,
) -> (f64, &'a [f64], &'a [f64], &'a [f64], &'a [f64]) {
    let (mean, rest) = if include_mean {
        (params[0], &params[1..])
    } else {
        (0.0, params)
    };
    let (ar, rest) = rest.split_at(spec.p);
    let (sar, rest) = rest.split_at(spec.cap_p);
    let (ma, sma) = rest.split_at(spec.q);
    (mean, ar, sar, ma, sma)
}

/// One-step errors `e_t = φ*(B)(w_t - μ) - Σ_{k≥1} θ*_k e_{t-k}` for
/// `t ≥ start`; earlier errors are zero.
fn conditional_residuals(
    w: &[f64],
    mean: f64,
    ar_terms: &[(usize, f64)],
    ma_terms: &[(usize, f64)],
    start: usize,
) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut value = w[t] - mean;
        for &(k, c) in ar_terms {
            value += c * (w[t - k] - mean);
        }
        for &(k, c) in ma_terms {
            if k <= t {
                value -= c * e[t - k];
            }
        }
        e[t] = value;
    }
    e
}

impl Forecaster for SARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.spec.validate()?;
        let values = series.values();

        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }
        let needed = self.spec.min_observations();
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let spec = self.spec;
        let op = differencing_operator(spec.d, spec.cap_d, spec.s);
        let w = apply_operator(values, &op);
        let include_mean = self.include_mean.unwrap_or(spec.d + spec.cap_d == 0);
        let start = spec.ar_lag();
        let n_eff = w.len() - start;
        let scale = match variance(&w) {
            v if v.is_finite() && v > 0.0 => v * n_eff as f64,
            _ => 1.0,
        };

        let mut initial = Vec::with_capacity(spec.num_coefficients() + 1);
        let mut bounds = Vec::with_capacity(spec.num_coefficients() + 1);
        if include_mean {
            initial.push(mean(&w));
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        for order in [spec.p, spec.cap_p, spec.q, spec.cap_q] {
            for i in 0..order {
                initial.push(0.1 / (i + 1) as f64);
                bounds.push((-COEFFICIENT_BOUND, COEFFICIENT_BOUND));
            }
        }

        let objective = |params: &[f64]| {
            let (mu, ar, sar, ma, sma) = split_params(&spec, params, include_mean);
            let ar_terms = sparse_terms(&lag_poly_mul(
                &seasonal_poly(ar, 1, -1.0),
                &seasonal_poly(sar, spec.s, -1.0),
            ));
            let ma_terms = sparse_terms(&lag_poly_mul(
                &seasonal_poly(ma, 1, 1.0),
                &seasonal_poly(sma, spec.s, 1.0),
            ));
            let e = conditional_residuals(&w, mu, &ar_terms, &ma_terms, start);
            e[start..].iter().map(|x| x * x).sum::<f64>() / scale
        };

        let (params, converged) = if initial.is_empty() {
            (Vec::new(), true)
        } else {
            let config = SimplexConfig {
                max_iter: (500 * initial.len()).min(5000),
                tolerance: 1e-10,
                ..Default::default()
            };
            let result = nelder_mead(objective, &initial, &bounds, config);
            tracing::debug!(
                spec = %spec,
                iterations = result.iterations,
                converged = result.converged,
                "conditional sum of squares minimised"
            );
            (result.point, result.converged)
        };

        if !converged {
            tracing::warn!(spec = %spec, "parameter search stopped before convergence");
        }

        self.set_parameters(&params, include_mean);

        let ar_terms = sparse_terms(&self.ar_polynomial());
        let ma_terms = sparse_terms(&self.ma_polynomial());
        let innovations = conditional_residuals(&w, self.mean, &ar_terms, &ma_terms, start);
        let residuals = innovations[start..].to_vec();

        let css: f64 = residuals.iter().map(|e| e * e).sum();
        let sigma2 = css / n_eff as f64;
        if !sigma2.is_finite() {
            return Err(ForecastError::ComputationError(format!(
                "{spec}: innovation variance is not finite"
            )));
        }

        if sigma2 < LIKELIHOOD_VARIANCE_FLOOR {
            tracing::warn!(spec = %spec, sigma2, "residual variance at floor; likelihood is bounded");
        }

        let n = n_eff as f64;
        let k = (initial.len() + 1) as f64;
        let likelihood_variance = sigma2.max(LIKELIHOOD_VARIANCE_FLOOR);
        let log_likelihood =
            -0.5 * n * ((2.0 * std::f64::consts::PI * likelihood_variance).ln() + 1.0);
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n.ln();

        let lost = op.len() - 1;
        let mut fitted = vec![f64::NAN; values.len()];
        for j in start..w.len() {
            fitted[j + lost] = values[j + lost] - innovations[j];
        }

        self.state = Some(FitState {
            history: values.to_vec(),
            differenced: w,
            innovations,
            residuals,
            fitted,
            sigma2,
            log_likelihood,
            aic,
            bic,
            converged,
        });

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(ForecastError::FitRequired)?;
        let start_index = state.history.len();

        if horizon == 0 {
            return Forecast::from_parts(start_index, Vec::new(), Vec::new());
        }

        let ar_terms = sparse_terms(&self.ar_polynomial());
        let ma_terms = sparse_terms(&self.ma_polynomial());

        let mut w = state.differenced.clone();
        let mut e = state.innovations.clone();
        for _ in 0..horizon {
            let t = w.len();
            let mut value = 0.0;
            for &(k, c) in &ar_terms {
                if k <= t {
                    value -= c * (w[t - k] - self.mean);
                }
            }
            // Future errors are zero in expectation.
            for &(k, c) in &ma_terms {
                if k <= t {
                    value += c * e[t - k];
                }
            }
            w.push(self.mean + value);
            e.push(0.0);
        }
        let future = w.split_off(state.differenced.len());

        let op = differencing_operator(self.spec.d, self.spec.cap_d, self.spec.s);
        let point = integrate(&future, &state.history, &op);

        let mut cumulative = 0.0;
        let standard_errors = self
            .psi_weights(horizon)
            .into_iter()
            .map(|psi| {
                cumulative += psi * psi;
                (state.sigma2 * cumulative).sqrt()
            })
            .collect();

        Forecast::from_parts(start_index, point, standard_errors)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.residuals.as_slice())
    }

    fn name(&self) -> &str {
        if self.spec.is_seasonal() {
            "SARIMA"
        } else {
            "ARIMA"
        }
    }
}
