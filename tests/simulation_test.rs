//! Simulation and trend properties over generated histories.

mod common;

use approx::assert_relative_eq;
use common::*;
use proptest::prelude::*;
use stockcast::domain::calendar::{future_dates, MarketSchedule};
use stockcast::domain::indicator::calculate_rsi;
use stockcast::domain::ohlcv::HistorySeries;
use stockcast::domain::random::RngSource;
use stockcast::domain::simulation::{self, HistoryStats};
use stockcast::domain::trend::{self, trend_strength, Direction};

fn series(closes: &[f64]) -> HistorySeries {
    HistorySeries::from_unsorted(bars_from_closes(date(2024, 1, 1), closes))
}

#[test]
fn linear_history_with_zero_draws_continues_upward() {
    let closes = linear_closes();
    let history = series(&closes);
    let stats = HistoryStats::from_history(&history);
    let mu = stats.mean_return;

    let points = simulation::generate(&history, 119.0, 5, &mut ScriptedSource::zeros());
    assert_eq!(points.len(), 5);

    let mut expected = 119.0;
    for p in &points {
        expected *= 1.0 + mu;
        assert_relative_eq!(p.close, expected, epsilon = 1e-9);
        assert_relative_eq!(p.percentage_change, mu * 100.0, epsilon = 1e-12);
    }

    let summary = trend::analyze(&history, &points);
    assert_eq!(summary.direction, Direction::Upward);
    assert!(summary.predicted_slope > 0.0);
    assert_relative_eq!(summary.historical_slope, 1.0, epsilon = 1e-9);
}

#[test]
fn flat_history_has_no_division_by_zero() {
    let history = series(&[50.0; 20]);
    let points = simulation::generate(&history, 50.0, 3, &mut RngSource::seeded(3));
    assert_eq!(points.len(), 3);
    for p in &points {
        assert_relative_eq!(p.close, 50.0, epsilon = 1e-12);
    }

    let summary = trend::analyze(&history, &points);
    assert!(summary.strength == 0.0 || summary.strength == 100.0);
    assert_relative_eq!(summary.support_level, 49.0, epsilon = 1e-9);
    assert_relative_eq!(summary.resistance_level, 51.0, epsilon = 1e-9);
    assert!(summary.momentum.rsi.is_finite());
    assert!(summary.momentum.macd.is_finite());
}

#[test]
fn empty_history_gives_empty_and_neutral() {
    let history = HistorySeries::empty();
    let points = simulation::generate(&history, 100.0, 5, &mut RngSource::seeded(1));
    assert!(points.is_empty());
    let summary = trend::analyze(&history, &points);
    assert!(summary.is_insufficient());
    assert_eq!(summary.momentum.rsi, 50.0);
}

#[test]
fn scripted_draws_are_applied_in_order() {
    // z for close, z2 for open, u for range
    let history = series(&[100.0, 102.0, 101.0, 103.0]);
    let stats = HistoryStats::from_history(&history);
    let mut source = ScriptedSource::new(&[1.0, -1.0], &[0.0]);
    let points = simulation::generate_with_stats(&stats, 100.0, 1, &mut source);

    let close = 100.0 * (1.0 + stats.mean_return + stats.volatility);
    let open = 100.0 * (1.0 + stats.mean_gap_ratio - stats.volatility / 2.0);
    assert_relative_eq!(points[0].close, close, epsilon = 1e-9);
    assert_relative_eq!(points[0].open, open, epsilon = 1e-9);
    let range = close * stats.mean_range_ratio * 0.8;
    assert_relative_eq!(points[0].high, close.max(open) + range / 2.0, epsilon = 1e-9);
    assert_relative_eq!(points[0].low, close.min(open) - range / 2.0, epsilon = 1e-9);
}

fn closes_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, 1..60)
}

proptest! {
    #[test]
    fn generate_returns_exactly_days_points(closes in closes_strategy(), days in 1usize..30, seed in any::<u64>()) {
        let history = series(&closes);
        let price = *closes.last().unwrap();
        let points = simulation::generate(&history, price, days, &mut RngSource::seeded(seed));
        prop_assert_eq!(points.len(), days);
        for (i, p) in points.iter().enumerate() {
            prop_assert_eq!(p.step, i + 1);
        }
    }

    #[test]
    fn generate_is_deterministic_for_a_seed(closes in closes_strategy(), days in 1usize..15, seed in any::<u64>()) {
        let history = series(&closes);
        let a = simulation::generate(&history, 100.0, days, &mut RngSource::seeded(seed));
        let b = simulation::generate(&history, 100.0, days, &mut RngSource::seeded(seed));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn wicks_enclose_the_body(closes in closes_strategy(), seed in any::<u64>()) {
        let history = series(&closes);
        let points = simulation::generate(&history, 100.0, 14, &mut RngSource::seeded(seed));
        for p in &points {
            prop_assert!(p.low <= p.open.min(p.close));
            prop_assert!(p.high >= p.open.max(p.close));
        }
    }

    #[test]
    fn rsi_is_bounded(closes in prop::collection::vec(-1000.0f64..1000.0, 0..80)) {
        let rsi = calculate_rsi(&closes);
        prop_assert!((0.0..=100.0).contains(&rsi));
    }

    #[test]
    fn strength_is_bounded(slope in -1e6f64..1e6, vol in 0.0f64..10.0) {
        let s = trend_strength(slope, vol);
        prop_assert!((0.0..=100.0).contains(&s));
    }

    #[test]
    fn analyze_strength_and_rsi_bounded(closes in closes_strategy(), days in 1usize..15, seed in any::<u64>()) {
        let history = series(&closes);
        let points = simulation::generate(&history, *closes.last().unwrap(), days, &mut RngSource::seeded(seed));
        let summary = trend::analyze(&history, &points);
        prop_assert!((0.0..=100.0).contains(&summary.strength));
        prop_assert!((0.0..=100.0).contains(&summary.momentum.rsi));
        prop_assert!(summary.support_level <= summary.resistance_level);
    }

    #[test]
    fn weekday_dates_increase_and_skip_weekends(offset in 0i64..3000, count in 0usize..40) {
        use chrono::{Datelike, Weekday};
        let start = date(2020, 1, 1) + chrono::Duration::days(offset);
        let dates = future_dates(start, count, MarketSchedule::Weekdays);
        prop_assert_eq!(dates.len(), count);
        let mut prev = start;
        for d in dates {
            prop_assert!(d > prev);
            prop_assert!(!matches!(d.weekday(), Weekday::Sat | Weekday::Sun));
            prev = d;
        }
    }
}
