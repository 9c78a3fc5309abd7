//! Order suggestion for seasonal ARIMA models.
//!
//! Fits a grid of candidate orders and ranks them by an information
//! criterion. The ranking is advisory: callers decide which orders to use.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{suggest_differencing, suggest_seasonal_differencing};
use crate::models::arima::model::{SARIMASpec, SARIMA};
use crate::models::Forecaster;

/// Information criterion used for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Criterion {
    #[default]
    Aic,
    Bic,
}

/// Configuration for [`OrderSearch`].
#[derive(Debug, Clone)]
pub struct OrderSearchConfig {
    /// Maximum non-seasonal AR order to consider.
    pub max_p: usize,
    /// Maximum non-seasonal differencing order.
    pub max_d: usize,
    /// Maximum non-seasonal MA order to consider.
    pub max_q: usize,
    /// Maximum seasonal AR order.
    pub max_cap_p: usize,
    /// Maximum seasonal differencing order.
    pub max_cap_d: usize,
    /// Maximum seasonal MA order.
    pub max_cap_q: usize,
    /// Seasonal period (0 for non-seasonal).
    pub seasonal_period: usize,
    /// Use the reduced stepwise grid instead of every combination.
    pub stepwise: bool,
    pub criterion: Criterion,
}

impl Default for OrderSearchConfig {
    fn default() -> Self {
        Self {
            max_p: 2,
            max_d: 2,
            max_q: 2,
            max_cap_p: 1,
            max_cap_d: 1,
            max_cap_q: 1,
            seasonal_period: 0,
            stepwise: true,
            criterion: Criterion::Aic,
        }
    }
}

impl OrderSearchConfig {
    /// Set maximum non-seasonal orders.
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    /// Set maximum seasonal orders.
    pub fn with_seasonal_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_cap_p = max_p;
        self.max_cap_d = max_d;
        self.max_cap_q = max_q;
        self
    }

    /// Set seasonal period.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    /// Use exhaustive search instead of stepwise.
    pub fn exhaustive(mut self) -> Self {
        self.stepwise = false;
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }
}

/// A fitted candidate and its criterion value (lower is better).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub spec: SARIMASpec,
    pub score: f64,
}

/// Candidate-order search over SARIMA specifications.
#[derive(Debug, Clone, Default)]
pub struct OrderSearch {
    config: OrderSearchConfig,
}

impl OrderSearch {
    pub fn new(config: OrderSearchConfig) -> Self {
        Self { config }
    }

    /// Search with default maxima and the given seasonal period.
    pub fn seasonal(period: usize) -> Self {
        Self::new(OrderSearchConfig::default().with_seasonal_period(period))
    }

    pub fn config(&self) -> &OrderSearchConfig {
        &self.config
    }

    fn seasonal_period(&self) -> usize {
        match self.config.seasonal_period {
            s if s > 1 => s,
            _ => 0,
        }
    }

    /// Candidate `(p, q, P, Q)` combinations.
    fn arma_orders(&self) -> Vec<(usize, usize, usize, usize)> {
        let c = &self.config;
        let seasonal = self.seasonal_period() > 0;

        let (nonseasonal, seasonal_pairs): (Vec<(usize, usize)>, Vec<(usize, usize)>) =
            if c.stepwise {
                (
                    vec![
                        (0, 0),
                        (1, 0),
                        (0, 1),
                        (1, 1),
                        (2, 0),
                        (0, 2),
                        (2, 1),
                        (1, 2),
                        (2, 2),
                    ],
                    vec![(0, 0), (1, 0), (0, 1), (1, 1)],
                )
            } else {
                (
                    grid(c.max_p, c.max_q),
                    grid(c.max_cap_p, c.max_cap_q),
                )
            };

        let seasonal_pairs = if seasonal { seasonal_pairs } else { vec![(0, 0)] };

        let mut orders = Vec::new();
        for &(p, q) in &nonseasonal {
            for &(cap_p, cap_q) in &seasonal_pairs {
                if p <= c.max_p && q <= c.max_q && cap_p <= c.max_cap_p && cap_q <= c.max_cap_q {
                    orders.push((p, q, cap_p, cap_q));
                }
            }
        }
        orders
    }

    /// All specifications to try, given the series.
    fn candidates(&self, values: &[f64]) -> Vec<SARIMASpec> {
        let s = self.seasonal_period();

        let suggested_d = suggest_differencing(values).min(self.config.max_d);
        let mut d_range = vec![suggested_d];
        if suggested_d > 0 {
            d_range.push(suggested_d - 1);
        }
        if suggested_d < self.config.max_d {
            d_range.push(suggested_d + 1);
        }
        d_range.sort_unstable();

        let cap_d = if s > 0 {
            suggest_seasonal_differencing(values, s).min(self.config.max_cap_d)
        } else {
            0
        };

        let mut specs = Vec::new();
        for &d in &d_range {
            for &(p, q, cap_p, cap_q) in &self.arma_orders() {
                specs.push(SARIMASpec::new(p, d, q, cap_p, cap_d, cap_q, s));
            }
        }
        specs
    }

    fn score(&self, model: &SARIMA) -> Option<f64> {
        match self.config.criterion {
            Criterion::Aic => model.aic(),
            Criterion::Bic => model.bic(),
        }
    }

    /// Fit every candidate and return them ranked by criterion, best first.
    ///
    /// Candidates that cannot be fitted to a series this short, or whose
    /// criterion is not finite, are skipped.
    pub fn run(&self, series: &TimeSeries) -> Result<Vec<Candidate>> {
        let values = series.values();
        let s = self.seasonal_period();
        let min_required = if s > 0 { 3 * s } else { 10 };
        if values.len() < min_required {
            return Err(ForecastError::InsufficientData {
                needed: min_required,
                got: values.len(),
            });
        }

        let specs = self.candidates(values);
        tracing::info!(candidates = specs.len(), "searching model orders");

        let mut ranked = Vec::with_capacity(specs.len());
        for spec in specs {
            if values.len() < spec.min_observations() {
                tracing::debug!(spec = %spec, "skipped: series too short");
                continue;
            }
            let mut model = SARIMA::from_spec(spec);
            match model.fit(series) {
                Ok(()) => match self.score(&model) {
                    Some(score) if score.is_finite() => {
                        tracing::debug!(spec = %spec, score, "candidate fitted");
                        ranked.push(Candidate { spec, score });
                    }
                    _ => tracing::debug!(spec = %spec, "skipped: non-finite criterion"),
                },
                Err(err) => tracing::debug!(spec = %spec, error = %err, "skipped: fit failed"),
            }
        }

        if ranked.is_empty() {
            return Err(ForecastError::ComputationError(
                "no candidate order could be fitted".to_string(),
            ));
        }

        ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
        Ok(ranked)
    }
}

fn grid(max_a: usize, max_b: usize) -> Vec<(usize, usize)> {
    (0..=max_a)
        .flat_map(|a| (0..=max_b).map(move |b| (a, b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::f64::consts::PI;

    fn hourly(values: Vec<f64>) -> TimeSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        TimeSeries::hourly(base, values).unwrap()
    }

    #[test]
    fn ranks_candidates_best_first() {
        let mut values = vec![10.0];
        for i in 1..120 {
            values.push(0.8 * values[i - 1] + 2.0 * (i as f64 * 1.7).sin());
        }
        let search = OrderSearch::new(OrderSearchConfig::default().with_max_orders(1, 1, 1));
        let ranked = search.run(&hourly(values)).unwrap();

        assert!(!ranked.is_empty());
        for w in ranked.windows(2) {
            assert!(w[0].score <= w[1].score);
        }
        assert!(ranked.iter().all(|c| !c.spec.is_seasonal()));
        assert!(ranked.iter().all(|c| c.spec.p <= 1 && c.spec.q <= 1));
    }

    #[test]
    fn seasonal_search_includes_seasonal_terms() {
        let values: Vec<f64> = (0..64)
            .map(|i| 50.0 + 15.0 * (2.0 * PI * i as f64 / 4.0).sin() + 0.3 * (i as f64 * 2.3).cos())
            .collect();
        let config = OrderSearchConfig::default()
            .with_max_orders(1, 1, 1)
            .with_seasonal_period(4);
        let ranked = OrderSearch::new(config).run(&hourly(values)).unwrap();

        assert!(ranked.iter().any(|c| c.spec.is_seasonal()));
        assert!(ranked.iter().all(|c| c.spec.s == 4));
    }

    #[test]
    fn exhaustive_grid_covers_every_pair() {
        let search = OrderSearch::new(
            OrderSearchConfig::default()
                .with_max_orders(1, 0, 2)
                .exhaustive(),
        );
        let orders = search.arma_orders();
        assert_eq!(orders.len(), 2 * 3);
    }

    #[test]
    fn stepwise_respects_maxima() {
        let search = OrderSearch::new(
            OrderSearchConfig::default()
                .with_max_orders(1, 1, 0)
                .with_seasonal_orders(0, 1, 1)
                .with_seasonal_period(24),
        );
        for (p, q, cap_p, cap_q) in search.arma_orders() {
            assert!(p <= 1 && q == 0 && cap_p == 0 && cap_q <= 1);
        }
    }

    #[test]
    fn insufficient_data() {
        let search = OrderSearch::seasonal(24);
        let err = search.run(&hourly(vec![1.0; 30])).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { needed: 72, got: 30 });
    }

    #[test]
    fn config_builders() {
        let config = OrderSearchConfig::default()
            .with_seasonal_period(24)
            .with_seasonal_orders(2, 1, 2)
            .with_criterion(Criterion::Bic);
        assert_eq!(config.seasonal_period, 24);
        assert_eq!(config.max_cap_p, 2);
        assert_eq!(config.max_cap_q, 2);
        assert_eq!(config.criterion, Criterion::Bic);
        assert!(config.stepwise);
    }
}
