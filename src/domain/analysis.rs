//! Per-symbol analysis session: fetch, simulate, analyze.
//!
//! A [`SymbolAnalyzer`] fetches the quote and history at most once for its
//! lifetime and keeps one simulated batch keyed by the horizon that produced
//! it. Asking again for the same horizon returns the same batch; a different
//! horizon replaces it. Time passing never invalidates anything.

use crate::domain::calendar::{future_dates, MarketSchedule};
use crate::domain::ohlcv::HistorySeries;
use crate::domain::quote::{NewsItem, Quote};
use crate::domain::random::RandomSource;
use crate::domain::simulation::{self, SimulationPoint};
use crate::domain::trend::{self, TrendSummary};
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

pub const DEFAULT_HISTORY_DAYS: usize = 30;

/// Explicit cache slot. Only a key mismatch triggers recomputation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cached<K, V> {
    #[default]
    Empty,
    Populated { key: K, value: V },
}

impl<K: PartialEq, V> Cached<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        match self {
            Cached::Populated { key: k, value } if k == key => Some(value),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&K> {
        match self {
            Cached::Populated { key, .. } => Some(key),
            Cached::Empty => None,
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, f: F) -> &V {
        if self.get(&key).is_none() {
            *self = Cached::Populated { value: f(), key };
        }
        match self {
            Cached::Populated { value, .. } => value,
            Cached::Empty => unreachable!("slot populated above"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Historical,
    Predictive,
}

/// One dated row of the history-plus-simulation series handed to presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
    pub kind: SeriesKind,
}

/// Snapshot of everything computed for one symbol and horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub days: usize,
    pub quote: Option<Quote>,
    pub history: HistorySeries,
    pub simulation: Vec<SimulationPoint>,
    pub trend: TrendSummary,
}

impl AnalysisResult {
    /// True when both a quote and history were available.
    pub fn has_data(&self) -> bool {
        self.quote.is_some() && !self.history.is_empty()
    }

    pub fn predicted_price(&self) -> Option<f64> {
        simulation::final_close(&self.simulation)
    }
}

pub struct SymbolAnalyzer<'a, P: ?Sized, R> {
    symbol: String,
    data: &'a P,
    rng: R,
    history_days: usize,
    quote: Cached<(), Option<Quote>>,
    history: Cached<(), HistorySeries>,
    simulation: Cached<usize, Vec<SimulationPoint>>,
}

impl<'a, P, R> SymbolAnalyzer<'a, P, R>
where
    P: MarketDataPort + ?Sized,
    R: RandomSource,
{
    pub fn new(symbol: &str, data: &'a P, rng: R) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            data,
            rng,
            history_days: DEFAULT_HISTORY_DAYS,
            quote: Cached::Empty,
            history: Cached::Empty,
            simulation: Cached::Empty,
        }
    }

    /// Fix the history window for this session. Must be set before the first fetch.
    pub fn with_history_days(mut self, days: usize) -> Self {
        self.history_days = days;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn schedule(&self) -> MarketSchedule {
        MarketSchedule::for_symbol(&self.symbol)
    }

    /// Latest quote, fetched on first use.
    pub fn quote(&mut self) -> Option<&Quote> {
        self.ensure_quote();
        self.quote.get(&()).and_then(Option::as_ref)
    }

    /// Daily history over the session's fixed window, fetched on first use.
    pub fn history(&mut self) -> &HistorySeries {
        self.ensure_history();
        self.cached_history()
    }

    /// Simulated batch of `days` points, reused while `days` is unchanged.
    pub fn simulation(&mut self, days: usize) -> &[SimulationPoint] {
        self.ensure_simulation(days);
        self.cached_simulation(days)
    }

    /// Trend summary over the current history and the `days` batch. Not cached.
    pub fn trend(&mut self, days: usize) -> TrendSummary {
        self.ensure_simulation(days);
        trend::analyze(self.cached_history(), self.cached_simulation(days))
    }

    /// History rows followed by the simulated rows on their future trading dates.
    pub fn combined_series(&mut self, days: usize) -> Vec<CombinedPoint> {
        self.ensure_simulation(days);
        let history = self.cached_history();
        let predicted = self.cached_simulation(days);

        let anchor = history
            .last_date()
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let dates = future_dates(anchor, predicted.len(), self.schedule());

        let mut combined: Vec<CombinedPoint> = history
            .bars()
            .iter()
            .map(|b| CombinedPoint {
                date: b.date,
                open: b.open,
                high: b.high,
                low: b.low,
                close: b.close,
                volume: b.volume,
                kind: SeriesKind::Historical,
            })
            .collect();

        combined.extend(predicted.iter().zip(dates).map(|(p, date)| CombinedPoint {
            date,
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
            volume: None,
            kind: SeriesKind::Predictive,
        }));

        combined
    }

    /// Latest news. Always fetched fresh; failures yield an empty list.
    pub fn news(&self, limit: usize) -> Vec<NewsItem> {
        match self.data.fetch_news(&self.symbol, limit) {
            Ok(items) => items.into_iter().take(limit).collect(),
            Err(e) => {
                warn!(symbol = %self.symbol, provider = self.data.name(), "news fetch failed: {}", e);
                Vec::new()
            }
        }
    }

    pub fn result(&mut self, days: usize) -> AnalysisResult {
        let trend = self.trend(days);
        AnalysisResult {
            symbol: self.symbol.clone(),
            days,
            quote: self.quote().cloned(),
            history: self.cached_history().clone(),
            simulation: self.cached_simulation(days).to_vec(),
            trend,
        }
    }

    fn ensure_quote(&mut self) {
        let data = self.data;
        let symbol = &self.symbol;
        self.quote.get_or_insert_with((), || match data.fetch_quote(symbol) {
            Ok(Some(q)) if q.price.is_finite() && q.price > 0.0 => Some(q),
            Ok(Some(q)) => {
                warn!(%symbol, price = q.price, "discarding quote without a usable price");
                None
            }
            Ok(None) => {
                warn!(%symbol, provider = data.name(), "no quote available");
                None
            }
            Err(e) => {
                warn!(%symbol, provider = data.name(), "quote fetch failed: {}", e);
                None
            }
        });
    }

    fn ensure_history(&mut self) {
        let data = self.data;
        let symbol = &self.symbol;
        let days = self.history_days;
        self.history.get_or_insert_with((), || match data.fetch_history(symbol, days) {
            Ok(bars) => match HistorySeries::new(symbol, bars.clone()) {
                Ok(series) => series,
                Err(e) => {
                    warn!(%symbol, "repairing history: {}", e);
                    HistorySeries::from_unsorted(bars)
                }
            },
            Err(e) => {
                warn!(%symbol, provider = data.name(), "history fetch failed: {}", e);
                HistorySeries::empty()
            }
        });
    }

    fn ensure_simulation(&mut self, days: usize) {
        self.ensure_history();
        if self.simulation.get(&days).is_some() {
            debug!(symbol = %self.symbol, days, "reusing cached simulation");
            return;
        }
        if self.cached_history().is_empty() {
            return;
        }
        let price = match self.quote() {
            Some(q) => q.price,
            None => return,
        };

        debug!(symbol = %self.symbol, days, "generating simulation");
        let history = match &self.history {
            Cached::Populated { value, .. } => value,
            Cached::Empty => return,
        };
        let batch = simulation::generate(history, price, days, &mut self.rng);
        self.simulation = Cached::Populated { key: days, value: batch };
    }

    fn cached_history(&self) -> &HistorySeries {
        static EMPTY: HistorySeries = HistorySeries::empty();
        self.history.get(&()).unwrap_or(&EMPTY)
    }

    fn cached_simulation(&self, days: usize) -> &[SimulationPoint] {
        self.simulation.get(&days).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::StockcastError;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::random::RngSource;
    use std::cell::Cell;

    struct CountingPort {
        bars: Vec<OhlcvBar>,
        quote: Option<Quote>,
        quote_calls: Cell<usize>,
        history_calls: Cell<usize>,
    }

    impl CountingPort {
        fn new(closes: &[f64], price: Option<f64>) -> Self {
            let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
            let bars = closes
                .iter()
                .enumerate()
                .map(|(i, &c)| OhlcvBar {
                    date: start + chrono::Duration::days(i as i64),
                    open: c,
                    high: c + 1.0,
                    low: c - 1.0,
                    close: c,
                    volume: Some(100),
                })
                .collect();
            Self {
                bars,
                quote: price.map(|p| Quote::from_prices("Test Corp", p, p)),
                quote_calls: Cell::new(0),
                history_calls: Cell::new(0),
            }
        }
    }

    impl MarketDataPort for CountingPort {
        fn name(&self) -> &str {
            "counting"
        }

        fn fetch_quote(&self, _symbol: &str) -> Result<Option<Quote>, StockcastError> {
            self.quote_calls.set(self.quote_calls.get() + 1);
            Ok(self.quote.clone())
        }

        fn fetch_history(&self, _symbol: &str, _days: usize) -> Result<Vec<OhlcvBar>, StockcastError> {
            self.history_calls.set(self.history_calls.get() + 1);
            Ok(self.bars.clone())
        }

        fn fetch_news(&self, _symbol: &str, _limit: usize) -> Result<Vec<NewsItem>, StockcastError> {
            Err(StockcastError::DataSource {
                reason: "offline".into(),
            })
        }
    }

    #[test]
    fn cached_slot_recomputes_only_on_key_change() {
        let mut slot: Cached<usize, u32> = Cached::Empty;
        let mut calls = 0;
        assert_eq!(*slot.get_or_insert_with(5, || { calls += 1; 10 }), 10);
        assert_eq!(*slot.get_or_insert_with(5, || { calls += 1; 20 }), 10);
        assert_eq!(*slot.get_or_insert_with(6, || { calls += 1; 30 }), 30);
        assert_eq!(calls, 2);
        assert_eq!(slot.key(), Some(&6));
        assert!(slot.get(&5).is_none());
    }

    #[test]
    fn quote_and_history_fetched_once() {
        let port = CountingPort::new(&[100.0, 101.0, 102.0], Some(102.0));
        let mut analyzer = SymbolAnalyzer::new("aapl", &port, RngSource::seeded(1));

        assert!(analyzer.quote().is_some());
        assert!(analyzer.quote().is_some());
        assert_eq!(analyzer.history().len(), 3);
        analyzer.trend(5);
        analyzer.combined_series(5);

        assert_eq!(port.quote_calls.get(), 1);
        assert_eq!(port.history_calls.get(), 1);
        assert_eq!(analyzer.symbol(), "AAPL");
    }

    #[test]
    fn missing_quote_is_memoized() {
        let port = CountingPort::new(&[100.0, 101.0], None);
        let mut analyzer = SymbolAnalyzer::new("AAPL", &port, RngSource::seeded(1));
        assert!(analyzer.quote().is_none());
        assert!(analyzer.quote().is_none());
        assert_eq!(port.quote_calls.get(), 1);
    }

    #[test]
    fn same_days_reuses_batch() {
        let port = CountingPort::new(&[100.0, 103.0, 99.0, 104.0], Some(104.0));
        let mut analyzer = SymbolAnalyzer::new("AAPL", &port, RngSource::seeded(7));
        let first = analyzer.simulation(5).to_vec();
        let second = analyzer.simulation(5).to_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn different_days_regenerates() {
        let port = CountingPort::new(&[100.0, 103.0, 99.0, 104.0], Some(104.0));
        let mut analyzer = SymbolAnalyzer::new("AAPL", &port, RngSource::seeded(7));
        assert_eq!(analyzer.simulation(5).len(), 5);
        assert_eq!(analyzer.simulation(3).len(), 3);
        let again = analyzer.simulation(5).to_vec();
        assert_eq!(again.len(), 5);
    }

    #[test]
    fn no_quote_means_no_simulation() {
        let port = CountingPort::new(&[100.0, 101.0], None);
        let mut analyzer = SymbolAnalyzer::new("AAPL", &port, RngSource::seeded(1));
        assert!(analyzer.simulation(5).is_empty());
        assert!(analyzer.trend(5).is_insufficient());
    }

    #[test]
    fn no_history_means_neutral_trend() {
        let port = CountingPort::new(&[], Some(100.0));
        let mut analyzer = SymbolAnalyzer::new("AAPL", &port, RngSource::seeded(1));
        assert!(analyzer.simulation(5).is_empty());
        assert_eq!(analyzer.trend(5), TrendSummary::neutral());
        assert!(analyzer.combined_series(5).is_empty());
    }

    #[test]
    fn news_failure_is_empty() {
        let port = CountingPort::new(&[100.0], Some(100.0));
        let analyzer = SymbolAnalyzer::new("AAPL", &port, RngSource::seeded(1));
        assert!(analyzer.news(5).is_empty());
    }

    #[test]
    fn result_snapshot() {
        let port = CountingPort::new(&[100.0, 101.0, 102.0, 103.0], Some(103.0));
        let mut analyzer = SymbolAnalyzer::new("AAPL", &port, RngSource::seeded(3));
        let result = analyzer.result(4);
        assert!(result.has_data());
        assert_eq!(result.simulation.len(), 4);
        assert_eq!(result.days, 4);
        assert_eq!(result.predicted_price(), result.simulation.last().map(|p| p.close));
    }
}
