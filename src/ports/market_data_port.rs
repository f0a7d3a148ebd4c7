//! Market data provider port trait.

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::quote::{NewsItem, Quote};

/// Supplier of quotes, daily history, and news for a symbol.
///
/// `Ok(None)` / an empty `Vec` mean the provider has nothing for the symbol;
/// `Err` means the provider itself failed (network, parse, missing key).
pub trait MarketDataPort {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>, StockcastError>;

    /// Up to `days` most recent daily bars, oldest first.
    fn fetch_history(&self, symbol: &str, days: usize) -> Result<Vec<OhlcvBar>, StockcastError>;

    fn fetch_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>, StockcastError>;
}

impl<T: MarketDataPort + ?Sized> MarketDataPort for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>, StockcastError> {
        (**self).fetch_quote(symbol)
    }

    fn fetch_history(&self, symbol: &str, days: usize) -> Result<Vec<OhlcvBar>, StockcastError> {
        (**self).fetch_history(symbol, days)
    }

    fn fetch_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>, StockcastError> {
        (**self).fetch_news(symbol, limit)
    }
}
