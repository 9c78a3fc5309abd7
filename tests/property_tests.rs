//! Property-based tests for confidence bounds and forecast alignment.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated forecasts and levels.

use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use follower_forecast::alignment::ForecastAlignment;
use follower_forecast::core::Forecast;
use follower_forecast::interval::{confidence_intervals, z_score};
use follower_forecast::ForecastError;
use proptest::prelude::*;

/// Strategy for point forecasts paired with non-negative standard errors.
fn forecast_strategy(max_len: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1..max_len).prop_flat_map(|len| {
        (
            prop::collection::vec(-1.0e4..1.0e4_f64, len),
            prop::collection::vec(0.0..500.0_f64, len),
        )
    })
}

/// Levels strictly inside (0, 1), away from the extremes.
fn level_strategy() -> impl Strategy<Value = f64> {
    0.01..0.999_f64
}

proptest! {
    #[test]
    fn bounds_bracket_the_point((points, ses) in forecast_strategy(60), level in level_strategy()) {
        let intervals = confidence_intervals(&points, &ses, level).unwrap();
        prop_assert_eq!(intervals.len(), points.len());
        for (interval, &point) in intervals.iter().zip(&points) {
            prop_assert!(interval.lower <= point);
            prop_assert!(point <= interval.upper);
        }
    }

    #[test]
    fn margins_are_symmetric((points, ses) in forecast_strategy(60), level in level_strategy()) {
        let intervals = confidence_intervals(&points, &ses, level).unwrap();
        for (interval, &point) in intervals.iter().zip(&points) {
            let below = point - interval.lower;
            let above = interval.upper - point;
            prop_assert!((below - above).abs() <= 1e-9 * (1.0 + point.abs()));
        }
    }

    #[test]
    fn width_grows_with_level(
        (points, ses) in forecast_strategy(30),
        a in level_strategy(),
        b in level_strategy(),
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let narrow = confidence_intervals(&points, &ses, low).unwrap();
        let wide = confidence_intervals(&points, &ses, high).unwrap();
        for (n, w) in narrow.iter().zip(&wide) {
            prop_assert!(n.width() <= w.width() + 1e-9);
        }
    }

    #[test]
    fn zero_standard_error_collapses(points in prop::collection::vec(-1.0e4..1.0e4_f64, 1..40), level in level_strategy()) {
        let ses = vec![0.0; points.len()];
        let intervals = confidence_intervals(&points, &ses, level).unwrap();
        for (interval, &point) in intervals.iter().zip(&points) {
            prop_assert_eq!(interval.lower, point);
            prop_assert_eq!(interval.upper, point);
        }
    }

    #[test]
    fn width_is_twice_z_times_se(se in 0.0..100.0_f64, level in level_strategy()) {
        let intervals = confidence_intervals(&[0.0], &[se], level).unwrap();
        let z = z_score(level).unwrap();
        prop_assert!((intervals[0].width() - 2.0 * z * se).abs() < 1e-9 * (1.0 + se));
    }

    #[test]
    fn levels_outside_unit_interval_fail(level in prop_oneof![-10.0..=0.0_f64, 1.0..10.0_f64]) {
        let result = confidence_intervals(&[1.0], &[1.0], level);
        prop_assert!(matches!(result, Err(ForecastError::InvalidArgument(_))));
    }

    #[test]
    fn aligned_steps_are_one_step_apart(
        start_index in 0usize..10_000,
        horizon in 1usize..100,
        step_minutes in 1i64..1_440,
        offset_minutes in -2_880i64..2_880,
    ) {
        let origin = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let step = Duration::minutes(step_minutes);
        let offset = Duration::minutes(offset_minutes);
        let alignment = ForecastAlignment::new(origin, step).unwrap().with_offset(offset);
        let forecast = Forecast::from_parts(start_index, vec![0.0; horizon], vec![1.0; horizon]).unwrap();

        let stamps = alignment.timestamps(&forecast).unwrap();
        prop_assert_eq!(stamps.len(), horizon);
        let expected_first = origin + step * start_index as i32 + offset;
        prop_assert_eq!(stamps[0], expected_first);
        for pair in stamps.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], step);
        }
    }
}

#[test]
fn ninety_five_percent_reference_case() {
    let intervals = confidence_intervals(&[10.0], &[2.0], 0.95).unwrap();
    assert_relative_eq!(intervals[0].lower, 6.080072, epsilon = 1e-5);
    assert_relative_eq!(intervals[0].upper, 13.919928, epsilon = 1e-5);
}

#[test]
fn degenerate_levels_fail() {
    for level in [0.0, 1.0] {
        assert!(matches!(
            confidence_intervals(&[10.0], &[2.0], level),
            Err(ForecastError::InvalidArgument(_))
        ));
    }
}
