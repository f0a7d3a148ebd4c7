//! Ordered provider chain: the first provider with data wins.

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::quote::{NewsItem, Quote};
use crate::ports::market_data_port::MarketDataPort;
use tracing::{debug, warn};

pub type SharedProvider = Box<dyn MarketDataPort + Send + Sync>;

pub struct FallbackAdapter {
    providers: Vec<SharedProvider>,
}

impl FallbackAdapter {
    pub fn new(providers: Vec<SharedProvider>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.name())
    }

    /// Try each provider in order. Errors and empty results move on to the next;
    /// the last error is returned only when no provider produced anything.
    fn first_with<T, F, E>(&self, what: &str, symbol: &str, fetch: F, is_empty: E) -> Result<T, StockcastError>
    where
        F: Fn(&dyn MarketDataPort) -> Result<T, StockcastError>,
        E: Fn(&T) -> bool,
        T: Default,
    {
        let mut last_err = None;
        for provider in &self.providers {
            match fetch(&**provider) {
                Ok(value) if !is_empty(&value) => {
                    debug!(%symbol, provider = provider.name(), "{} served", what);
                    return Ok(value);
                }
                Ok(_) => {
                    debug!(%symbol, provider = provider.name(), "no {}, trying next provider", what);
                }
                Err(e) => {
                    warn!(%symbol, provider = provider.name(), "{} fetch failed: {}", what, e);
                    last_err = Some(e);
                }
            }
        }
        match last_err {
            Some(e) => Err(e),
            None => Ok(T::default()),
        }
    }
}

impl MarketDataPort for FallbackAdapter {
    fn name(&self) -> &str {
        "fallback"
    }

    fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>, StockcastError> {
        self.first_with("quote", symbol, |p| p.fetch_quote(symbol), Option::is_none)
    }

    fn fetch_history(&self, symbol: &str, days: usize) -> Result<Vec<OhlcvBar>, StockcastError> {
        let bars = self.first_with("history", symbol, |p| p.fetch_history(symbol, days), Vec::is_empty)?;
        let start = bars.len().saturating_sub(days);
        Ok(bars[start..].to_vec())
    }

    fn fetch_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>, StockcastError> {
        self.first_with("news", symbol, |p| p.fetch_news(symbol, limit), Vec::is_empty)
    }
}
