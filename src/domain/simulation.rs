//! Synthetic OHLC path generation from historical return statistics.
//!
//! Each step draws a daily return from Normal(mu, sigma) around the historical
//! mean return, derives the open from the average overnight gap, and spreads
//! high/low by the average intraday range. The output is an illustrative
//! stochastic simulation, not a calibrated forecast.

use crate::domain::ohlcv::HistorySeries;
use crate::domain::random::RandomSource;
use crate::domain::stats::{mean, pct_change, sample_stddev};
use serde::Serialize;

/// Statistics the simulation is parameterised by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryStats {
    /// Mean period return (mu). 0 when history has fewer than two closes.
    pub mean_return: f64,
    /// Sample stddev of period returns (sigma). 0 with fewer than two returns.
    pub volatility: f64,
    /// Mean of (high - low) / close.
    pub mean_range_ratio: f64,
    /// Mean of (open - prev_close) / prev_close.
    pub mean_gap_ratio: f64,
}

impl HistoryStats {
    pub fn from_history(history: &HistorySeries) -> Self {
        let bars = history.bars();
        let returns = pct_change(&history.closes());

        let ranges: Vec<f64> = bars.iter().map(|b| b.range_ratio()).collect();
        let gaps: Vec<f64> = bars
            .windows(2)
            .filter(|w| w[0].close != 0.0)
            .map(|w| w[1].gap_ratio(w[0].close))
            .collect();

        Self {
            mean_return: mean(&returns),
            volatility: sample_stddev(&returns),
            mean_range_ratio: mean(&ranges),
            mean_gap_ratio: mean(&gaps),
        }
    }
}

/// One synthetic period. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationPoint {
    /// 1-based offset from the last observed period.
    pub step: usize,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Return applied to the previous close, in percent.
    pub percentage_change: f64,
}

/// Generate `days` synthetic points starting from `current_price`.
///
/// Returns an empty batch when history is empty or `days` is 0. Draw order per
/// step is fixed (close normal, open normal, range uniform), so a given source
/// sequence always produces the same batch.
pub fn generate<R: RandomSource + ?Sized>(
    history: &HistorySeries,
    current_price: f64,
    days: usize,
    rng: &mut R,
) -> Vec<SimulationPoint> {
    if history.is_empty() || days == 0 {
        return Vec::new();
    }

    let stats = HistoryStats::from_history(history);
    generate_with_stats(&stats, current_price, days, rng)
}

pub fn generate_with_stats<R: RandomSource + ?Sized>(
    stats: &HistoryStats,
    current_price: f64,
    days: usize,
    rng: &mut R,
) -> Vec<SimulationPoint> {
    let mut points = Vec::with_capacity(days);
    let mut last = current_price;

    for step in 1..=days {
        let z = rng.standard_normal();
        let daily_return = stats.mean_return + z * stats.volatility;
        let close = last * (1.0 + daily_return);

        let z2 = rng.standard_normal();
        let open = last * (1.0 + stats.mean_gap_ratio + z2 * stats.volatility / 2.0);

        let u = rng.uniform();
        let range = close * stats.mean_range_ratio * (0.8 + 0.4 * u);
        let body_high = close.max(open);
        let body_low = close.min(open);

        // range is negative when close or the range ratio is; keep the wick outside the body
        let high = (body_high + range / 2.0).max(body_high);
        let low = (body_low - range / 2.0).min(body_low);

        points.push(SimulationPoint {
            step,
            open,
            high,
            low,
            close,
            percentage_change: daily_return * 100.0,
        });

        last = close;
    }

    points
}

/// Sum of per-step percentage changes.
pub fn cumulative_change_pct(points: &[SimulationPoint]) -> f64 {
    points.iter().map(|p| p.percentage_change).sum()
}

pub fn final_close(points: &[SimulationPoint]) -> Option<f64> {
    points.last().map(|p| p.close)
}

pub fn closes(points: &[SimulationPoint]) -> Vec<f64> {
    points.iter().map(|p| p.close).collect()
}
