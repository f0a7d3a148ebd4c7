//! MACD (Moving Average Convergence Divergence) line.
//!
//! MACD Line = EMA(fast) - EMA(slow), both seeded from the first close.
//! Default parameters: fast=12, slow=26

use crate::domain::indicator::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;

/// The MACD line at every position.
pub fn calculate_macd_line(closes: &[f64], fast: usize, slow: usize) -> Vec<f64> {
    if closes.is_empty() || fast == 0 || slow == 0 {
        return Vec::new();
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect()
}

/// MACD line evaluated at the last close, 0 for empty input.
pub fn macd_last(closes: &[f64], fast: usize, slow: usize) -> f64 {
    calculate_macd_line(closes, fast, slow)
        .last()
        .copied()
        .unwrap_or(0.0)
}
