//! Seasonal ARIMA (Autoregressive Integrated Moving Average) models.
//!
//! This module provides:
//! - SARIMA(p, d, q)(P, D, Q)\[s\] estimation and forecasting with standard errors
//! - Differencing operators and their inverse
//! - A candidate-order search ranked by information criteria

mod diff;
mod model;
mod search;

pub use diff::{
    apply_operator, difference, differencing_operator, integrate, seasonal_difference,
    suggest_differencing, suggest_seasonal_differencing,
};
pub use model::{SARIMASpec, SARIMA};
pub use search::{Candidate, Criterion, OrderSearch, OrderSearchConfig};
