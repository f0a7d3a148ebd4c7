//! Portfolio aggregation: one independent analysis session per holding.

use crate::domain::analysis::{SymbolAnalyzer, DEFAULT_HISTORY_DAYS};
use crate::domain::holdings::{Holding, PositionSide};
use crate::domain::random::RngSource;
use crate::domain::trend::Direction;
use crate::ports::market_data_port::MarketDataPort;
use serde::Serialize;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioOptions {
    pub days: usize,
    pub history_days: usize,
    /// Base seed; holding `i` is simulated with `seed + i`.
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl Default for PortfolioOptions {
    fn default() -> Self {
        Self {
            days: 5,
            history_days: DEFAULT_HISTORY_DAYS,
            seed: None,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingAnalysis {
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub side: PositionSide,
    pub current_price: f64,
    pub predicted_price: f64,
    /// Negative for short positions.
    pub current_value: f64,
    pub predicted_value: f64,
    pub predicted_change_pct: f64,
    pub expected_pnl: f64,
    pub direction: Direction,
    pub strength: f64,
    pub rsi: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrendBreakdown {
    pub upward: f64,
    pub downward: f64,
    pub sideways: f64,
    pub unknown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionEntry {
    pub symbol: String,
    pub value: f64,
    pub weight_pct: f64,
    pub side: PositionSide,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendBucket {
    pub direction: Direction,
    pub count: usize,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceEntry {
    pub symbol: String,
    pub predicted_change_pct: f64,
    pub expected_pnl: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub days: usize,
    pub holdings: Vec<HoldingAnalysis>,
    /// Symbols that could not be analyzed (no quote).
    pub skipped: Vec<String>,
    pub total_value: f64,
    pub total_predicted_value: f64,
    /// Predicted value against current value in percent, 0 for an empty total.
    pub prediction_change_pct: f64,
    pub expected_pnl: f64,
    pub overall_trend: Direction,
    pub trend_pct: TrendBreakdown,
}

impl PortfolioSummary {
    pub fn count(&self, direction: Direction) -> usize {
        self.holdings.iter().filter(|h| h.direction == direction).count()
    }

    /// Holdings by absolute value, largest first, with their share of the total.
    pub fn composition(&self) -> Vec<CompositionEntry> {
        let mut entries: Vec<CompositionEntry> = self
            .holdings
            .iter()
            .map(|h| {
                let value = h.current_value.abs();
                CompositionEntry {
                    symbol: h.symbol.clone(),
                    value,
                    weight_pct: percent(value, self.total_value),
                    side: h.side,
                }
            })
            .collect();
        entries.sort_by(|a, b| b.value.total_cmp(&a.value));
        entries
    }

    pub fn trend_distribution(&self) -> Vec<TrendBucket> {
        Direction::ALL
            .iter()
            .map(|&direction| {
                let count = self.count(direction);
                TrendBucket {
                    direction,
                    count,
                    pct: percent(count as f64, self.holdings.len() as f64),
                }
            })
            .collect()
    }

    /// Holdings ranked by predicted change, best first.
    pub fn performance_comparison(&self) -> Vec<PerformanceEntry> {
        let mut entries: Vec<PerformanceEntry> = self
            .holdings
            .iter()
            .map(|h| PerformanceEntry {
                symbol: h.symbol.clone(),
                predicted_change_pct: h.predicted_change_pct,
                expected_pnl: h.expected_pnl,
                direction: h.direction,
            })
            .collect();
        entries.sort_by(|a, b| b.predicted_change_pct.total_cmp(&a.predicted_change_pct));
        entries
    }
}

/// Analyze every holding and aggregate. `None` when there are no holdings.
pub fn analyze_portfolio<P>(
    holdings: &[Holding],
    data: &P,
    options: &PortfolioOptions,
) -> Option<PortfolioSummary>
where
    P: MarketDataPort + Sync + ?Sized,
{
    if holdings.is_empty() {
        return None;
    }

    let base_seed = options.seed.unwrap_or_else(rand::random::<u64>);
    info!(holdings = holdings.len(), days = options.days, "analyzing portfolio");

    let indexed: Vec<(usize, &Holding)> = holdings.iter().enumerate().collect();
    let outcomes = map_holdings(
        &indexed,
        |&(i, holding)| {
            let seed = base_seed.wrapping_add(i as u64);
            analyze_holding(holding, data, options, seed).ok_or_else(|| holding.symbol.clone())
        },
        !options.parallel,
    );

    let mut analyzed = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(h) => analyzed.push(h),
            Err(symbol) => skipped.push(symbol),
        }
    }

    Some(summarize(analyzed, skipped, options.days))
}

/// Analyze one holding in its own session. `None` when no quote is available.
pub fn analyze_holding<P>(
    holding: &Holding,
    data: &P,
    options: &PortfolioOptions,
    seed: u64,
) -> Option<HoldingAnalysis>
where
    P: MarketDataPort + ?Sized,
{
    let mut analyzer = SymbolAnalyzer::new(&holding.symbol, data, RngSource::seeded(seed))
        .with_history_days(options.history_days);

    let quote = match analyzer.quote() {
        Some(q) => q.clone(),
        None => {
            warn!(symbol = %holding.symbol, "skipping holding without a quote");
            return None;
        }
    };
    let result = analyzer.result(options.days);

    let current_price = quote.price;
    let predicted_price = result.predicted_price().unwrap_or(current_price);
    let sign = holding.side.sign();
    let predicted_change_pct = (predicted_price - current_price) / current_price * 100.0;
    debug!(symbol = %holding.symbol, current_price, predicted_price, "holding analyzed");

    Some(HoldingAnalysis {
        symbol: holding.symbol.clone(),
        name: quote.name,
        quantity: holding.quantity,
        side: holding.side,
        current_price,
        predicted_price,
        current_value: sign * current_price * holding.quantity,
        predicted_value: predicted_price * holding.quantity,
        predicted_change_pct,
        expected_pnl: sign * (predicted_price - current_price) * holding.quantity,
        direction: result.trend.direction,
        strength: result.trend.strength,
        rsi: result.trend.momentum.rsi,
    })
}

fn summarize(holdings: Vec<HoldingAnalysis>, skipped: Vec<String>, days: usize) -> PortfolioSummary {
    let total_value = holdings.iter().map(|h| h.current_value.abs()).sum();
    let total_predicted_value = holdings.iter().map(|h| h.predicted_value).sum();
    let expected_pnl = holdings.iter().map(|h| h.expected_pnl).sum();
    let prediction_change_pct = percent(total_predicted_value - total_value, total_value);

    let mut summary = PortfolioSummary {
        days,
        holdings,
        skipped,
        total_value,
        total_predicted_value,
        prediction_change_pct,
        expected_pnl,
        overall_trend: Direction::Sideways,
        trend_pct: TrendBreakdown::default(),
    };

    let up = summary.count(Direction::Upward);
    let down = summary.count(Direction::Downward);
    let side = summary.count(Direction::Sideways);
    summary.overall_trend = overall_trend(up, down, side);

    let n = summary.holdings.len() as f64;
    summary.trend_pct = TrendBreakdown {
        upward: percent(up as f64, n),
        downward: percent(down as f64, n),
        sideways: percent(side as f64, n),
        unknown: percent(summary.count(Direction::Unknown) as f64, n),
    };
    summary
}

/// Majority rule: a direction wins only when it outnumbers the other two combined.
pub fn overall_trend(up: usize, down: usize, sideways: usize) -> Direction {
    if up > down + sideways {
        Direction::Upward
    } else if down > up + sideways {
        Direction::Downward
    } else {
        Direction::Sideways
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

/// Order-preserving map, parallel when the `parallel` feature is on.
fn map_holdings<T, F, R>(items: &[T], f: F, force_sequential: bool) -> Vec<R>
where
    T: Sync,
    F: Fn(&T) -> R + Sync + Send,
    R: Send,
{
    #[cfg(feature = "parallel")]
    {
        if force_sequential {
            items.iter().map(f).collect()
        } else {
            items.par_iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = force_sequential;
        items.iter().map(f).collect()
    }
}
