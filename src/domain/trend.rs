//! Trend, support/resistance, and momentum derived from history plus a simulated path.

use crate::domain::indicator::{calculate_rsi, macd_last, DEFAULT_FAST, DEFAULT_SLOW, NEUTRAL_RSI};
use crate::domain::ohlcv::HistorySeries;
use crate::domain::simulation::{self, SimulationPoint};
use crate::domain::stats::{self, ols_slope, pct_change, sample_stddev};
use serde::Serialize;
use std::fmt;

/// Number of most recent historical closes the trend window looks at.
pub const TREND_WINDOW: usize = 20;
/// Predicted slopes within +/- this band count as sideways.
pub const SIDEWAYS_BAND: f64 = 0.001;
const SUPPORT_FACTOR: f64 = 0.98;
const RESISTANCE_FACTOR: f64 = 1.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upward,
    Downward,
    Sideways,
    Unknown,
}

impl Direction {
    pub fn from_slope(slope: f64) -> Self {
        if slope > SIDEWAYS_BAND {
            Direction::Upward
        } else if slope < -SIDEWAYS_BAND {
            Direction::Downward
        } else {
            Direction::Sideways
        }
    }

    pub const ALL: [Direction; 4] = [
        Direction::Upward,
        Direction::Downward,
        Direction::Sideways,
        Direction::Unknown,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Upward => "upward",
            Direction::Downward => "downward",
            Direction::Sideways => "sideways",
            Direction::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Momentum {
    pub rsi: f64,
    pub macd: f64,
}

/// Derived trend view. Recomputed on demand, never persisted.
///
/// `Direction::Unknown` with zero support/resistance means there was not
/// enough data; those levels are not real prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSummary {
    pub direction: Direction,
    pub strength: f64,
    pub support_level: f64,
    pub resistance_level: f64,
    pub momentum: Momentum,
    pub historical_slope: f64,
    pub predicted_slope: f64,
}

impl TrendSummary {
    pub fn neutral() -> Self {
        Self {
            direction: Direction::Unknown,
            strength: 0.0,
            support_level: 0.0,
            resistance_level: 0.0,
            momentum: Momentum {
                rsi: NEUTRAL_RSI,
                macd: 0.0,
            },
            historical_slope: 0.0,
            predicted_slope: 0.0,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.direction == Direction::Unknown
    }
}

pub fn analyze(history: &HistorySeries, simulation: &[SimulationPoint]) -> TrendSummary {
    if history.is_empty() || simulation.is_empty() {
        return TrendSummary::neutral();
    }

    let all_closes = history.closes();
    let hist_closes = &all_closes[all_closes.len().saturating_sub(TREND_WINDOW)..];
    let pred_closes = simulation::closes(simulation);

    let historical_slope = ols_slope(hist_closes);
    let predicted_slope = ols_slope(&pred_closes);

    let volatility = sample_stddev(&pct_change(&all_closes));
    let strength = trend_strength(predicted_slope, volatility);

    // both windows are non-empty here
    let lowest = stats::min(hist_closes)
        .unwrap_or(0.0)
        .min(stats::min(&pred_closes).unwrap_or(0.0));
    let highest = stats::max(hist_closes)
        .unwrap_or(0.0)
        .max(stats::max(&pred_closes).unwrap_or(0.0));

    let mut joined = hist_closes.to_vec();
    joined.extend_from_slice(&pred_closes);

    TrendSummary {
        direction: Direction::from_slope(predicted_slope),
        strength,
        support_level: lowest * SUPPORT_FACTOR,
        resistance_level: highest * RESISTANCE_FACTOR,
        momentum: Momentum {
            rsi: calculate_rsi(&joined),
            macd: macd_last(&all_closes, DEFAULT_FAST, DEFAULT_SLOW),
        },
        historical_slope,
        predicted_slope,
    }
}

/// |slope| normalised by ten times the historical volatility, scaled to 0..=100.
///
/// With zero volatility any non-zero slope is maximal and a flat one is 0.
pub fn trend_strength(predicted_slope: f64, volatility: f64) -> f64 {
    if !predicted_slope.is_finite() {
        return 0.0;
    }
    if volatility == 0.0 || !volatility.is_finite() {
        return if predicted_slope != 0.0 { 100.0 } else { 0.0 };
    }
    let normalized = predicted_slope.abs() / (volatility * 10.0);
    (normalized * 100.0).clamp(0.0, 100.0)
}
