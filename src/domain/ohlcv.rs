//! OHLC bar representation and the ordered history series.

use crate::domain::error::StockcastError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One observed period of trading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}

impl OhlcvBar {
    /// (high - low) / close, 0 when close is 0.
    pub fn range_ratio(&self) -> f64 {
        if self.close == 0.0 {
            0.0
        } else {
            (self.high - self.low) / self.close
        }
    }

    /// Overnight gap relative to the previous close, 0 when prev_close is 0.
    pub fn gap_ratio(&self, prev_close: f64) -> f64 {
        if prev_close == 0.0 {
            0.0
        } else {
            (self.open - prev_close) / prev_close
        }
    }

    /// All four prices are finite numbers.
    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite())
    }
}

/// Chronologically ordered bars with strictly increasing dates.
///
/// Never mutated after construction; statistics are computed from it directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySeries {
    bars: Vec<OhlcvBar>,
}

impl HistorySeries {
    /// Build a series from bars that must already be in strictly increasing date order
    /// and carry only finite prices.
    pub fn new(symbol: &str, bars: Vec<OhlcvBar>) -> Result<Self, StockcastError> {
        if let Some(bad) = bars.iter().find(|b| !b.is_finite()) {
            return Err(StockcastError::InvalidHistory {
                symbol: symbol.to_string(),
                reason: format!("non-finite price on {}", bad.date),
            });
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(StockcastError::InvalidHistory {
                symbol: symbol.to_string(),
                reason: format!("date {} does not follow {}", pair[1].date, pair[0].date),
            });
        }
        Ok(Self { bars })
    }

    /// Sort by date and drop duplicate dates, keeping the later observation.
    /// Bars with a non-finite price are discarded.
    pub fn from_unsorted(mut bars: Vec<OhlcvBar>) -> Self {
        bars.retain(|b| {
            if !b.is_finite() {
                warn!(date = %b.date, "dropping bar with non-finite price");
            }
            b.is_finite()
        });
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self { bars: deduped }
    }

    pub const fn empty() -> Self {
        Self { bars: Vec::new() }
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// The most recent `n` bars (all of them when shorter).
    pub fn tail(&self, n: usize) -> HistorySeries {
        let start = self.bars.len().saturating_sub(n);
        HistorySeries {
            bars: self.bars[start..].to_vec(),
        }
    }
}
