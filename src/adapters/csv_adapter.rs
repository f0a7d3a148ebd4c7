//! CSV directory market data adapter.
//!
//! Layout under the base directory:
//! - `{SYMBOL}.csv`: `date,open,high,low,close[,volume]` daily bars
//! - `quotes.csv`: `symbol,name,price,previous_close` (optional)
//! - `{SYMBOL}_news.csv`: `title,date,url,source,summary` (optional)
//!
//! Without a `quotes.csv` row the quote is derived from the last two bars.

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::{HistorySeries, OhlcvBar};
use crate::domain::quote::{NewsItem, Quote};
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const QUOTES_FILE: &str = "quotes.csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct BarRecord {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(default, alias = "Volume")]
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct QuoteRecord {
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    price: f64,
    #[serde(default)]
    previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NewsRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn history_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn news_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}_news.csv", symbol))
    }

    /// File contents, or `None` when the file does not exist.
    fn read_optional(path: &Path) -> Result<Option<String>, StockcastError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no such file");
                Ok(None)
            }
            Err(e) => Err(StockcastError::DataSource {
                reason: format!("failed to read {}: {}", path.display(), e),
            }),
        }
    }

    fn load_series(&self, symbol: &str) -> Result<HistorySeries, StockcastError> {
        match Self::read_optional(&self.history_path(symbol))? {
            Some(content) => Ok(HistorySeries::from_unsorted(parse_bars(&content)?)),
            None => Ok(HistorySeries::empty()),
        }
    }
}

/// Parse daily bars from CSV text with a header row.
///
/// Rows with a non-finite price (`NaN`, `inf`) are skipped.
pub fn parse_bars(content: &str) -> Result<Vec<OhlcvBar>, StockcastError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.deserialize::<BarRecord>() {
        let record = result?;
        let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").map_err(|e| {
            StockcastError::DataSource {
                reason: format!("invalid date format '{}': {}", record.date, e),
            }
        })?;
        let bar = OhlcvBar {
            date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume.map(|v| v as i64),
        };
        if !bar.is_finite() {
            warn!(%date, "skipping row with non-finite price");
            continue;
        }
        bars.push(bar);
    }
    Ok(bars)
}

/// Quote from the last two bars: last close against the one before it.
pub fn quote_from_history(name: &str, series: &HistorySeries) -> Option<Quote> {
    let bars = series.bars();
    let last = bars.last()?;
    let previous_close = if bars.len() >= 2 {
        bars[bars.len() - 2].close
    } else {
        last.open
    };
    Some(Quote::from_prices(name, last.close, previous_close))
}

impl MarketDataPort for CsvAdapter {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>, StockcastError> {
        if let Some(content) = Self::read_optional(&self.base_path.join(QUOTES_FILE))? {
            let mut rdr = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(content.as_bytes());
            for result in rdr.deserialize::<QuoteRecord>() {
                let record = result?;
                if record.symbol.eq_ignore_ascii_case(symbol) {
                    let name = record.name.unwrap_or_else(|| symbol.to_string());
                    let previous = record.previous_close.unwrap_or(0.0);
                    return Ok(Some(Quote::from_prices(name, record.price, previous)));
                }
            }
        }

        let series = self.load_series(symbol)?;
        Ok(quote_from_history(symbol, &series))
    }

    fn fetch_history(&self, symbol: &str, days: usize) -> Result<Vec<OhlcvBar>, StockcastError> {
        let series = self.load_series(symbol)?;
        Ok(series.tail(days).bars().to_vec())
    }

    fn fetch_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>, StockcastError> {
        let content = match Self::read_optional(&self.news_path(symbol))? {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut items = Vec::new();
        for result in rdr.deserialize::<NewsRecord>().take(limit) {
            let record = result?;
            let source = record.source.unwrap_or_else(|| self.name().to_string());
            items.push(NewsItem::with_defaults(
                record.title,
                record.date,
                record.url,
                &source,
                record.summary,
            ));
        }
        Ok(items)
    }
}
