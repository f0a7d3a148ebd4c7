#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::collections::VecDeque;
use stockcast::domain::error::StockcastError;
pub use stockcast::domain::ohlcv::OhlcvBar;
use stockcast::domain::quote::{NewsItem, Quote};
use stockcast::domain::random::RandomSource;
use stockcast::ports::market_data_port::MarketDataPort;

pub struct MockMarketData {
    pub bars: HashMap<String, Vec<OhlcvBar>>,
    pub quotes: HashMap<String, Quote>,
    pub news: HashMap<String, Vec<NewsItem>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            quotes: HashMap::new(),
            news: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_quote(mut self, symbol: &str, price: f64) -> Self {
        self.quotes
            .insert(symbol.to_string(), Quote::from_prices(symbol, price, price));
        self
    }

    /// History plus a quote priced at the last close.
    pub fn with_closes(self, symbol: &str, start: NaiveDate, closes: &[f64]) -> Self {
        let price = closes.last().copied().unwrap_or(0.0);
        self.with_bars(symbol, bars_from_closes(start, closes))
            .with_quote(symbol, price)
    }

    pub fn with_news(mut self, symbol: &str, items: Vec<NewsItem>) -> Self {
        self.news.insert(symbol.to_string(), items);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn check(&self, symbol: &str) -> Result<(), StockcastError> {
        match self.errors.get(symbol) {
            Some(reason) => Err(StockcastError::DataSource {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl MarketDataPort for MockMarketData {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>, StockcastError> {
        self.check(symbol)?;
        Ok(self.quotes.get(symbol).cloned())
    }

    fn fetch_history(&self, symbol: &str, days: usize) -> Result<Vec<OhlcvBar>, StockcastError> {
        self.check(symbol)?;
        let bars = self.bars.get(symbol).cloned().unwrap_or_default();
        let start = bars.len().saturating_sub(days);
        Ok(bars[start..].to_vec())
    }

    fn fetch_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>, StockcastError> {
        self.check(symbol)?;
        Ok(self
            .news
            .get(symbol)
            .map(|items| items.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

/// Replays fixed normal and uniform draws, then repeats the last value.
pub struct ScriptedSource {
    normals: VecDeque<f64>,
    uniforms: VecDeque<f64>,
    last_normal: f64,
    last_uniform: f64,
}

impl ScriptedSource {
    pub fn new(normals: &[f64], uniforms: &[f64]) -> Self {
        Self {
            normals: normals.iter().copied().collect(),
            uniforms: uniforms.iter().copied().collect(),
            last_normal: 0.0,
            last_uniform: 0.5,
        }
    }

    /// Every normal draw is 0 and every uniform draw 0.5.
    pub fn zeros() -> Self {
        Self::new(&[], &[])
    }
}

impl RandomSource for ScriptedSource {
    fn standard_normal(&mut self) -> f64 {
        if let Some(v) = self.normals.pop_front() {
            self.last_normal = v;
        }
        self.last_normal
    }

    fn uniform(&mut self) -> f64 {
        if let Some(v) = self.uniforms.pop_front() {
            self.last_uniform = v;
        }
        self.last_uniform
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bars on consecutive weekdays ending on or after `start`, with a 1% wick either side.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    use chrono::{Datelike, Weekday};
    let mut day = start;
    let mut bars = Vec::with_capacity(closes.len());
    for &close in closes {
        while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day = day.succ_opt().unwrap();
        }
        bars.push(OhlcvBar {
            date: day,
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: Some(1_000),
        });
        day = day.succ_opt().unwrap();
    }
    bars
}

/// Closes 100, 101, ..., 119.
pub fn linear_closes() -> Vec<f64> {
    (0..20).map(|i| 100.0 + i as f64).collect()
}
