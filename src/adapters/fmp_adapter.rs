//! Financial Modeling Prep HTTP adapter.
//!
//! Quotes from `/api/v3/quote/{symbol}`, daily history from
//! `/api/v3/historical-price-full/{symbol}`, news from `/api/v3/stock_news`.

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::{HistorySeries, OhlcvBar};
use crate::domain::quote::{NewsItem, Quote};
use crate::ports::market_data_port::MarketDataPort;
use chrono::{Duration, Local, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

pub const FMP_URL: &str = "https://financialmodelingprep.com";
/// Extra calendar days requested so weekends and holidays still leave `days` bars.
const HISTORY_BUFFER_DAYS: i64 = 5;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpQuote {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    changes_percentage: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct FmpHistory {
    #[serde(default)]
    historical: Vec<FmpBar>,
}

#[derive(Debug, Clone, Deserialize)]
struct FmpBar {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpNews {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    site: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

pub struct FmpAdapter {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl FmpAdapter {
    pub fn new(api_key: Option<String>, base_url: Option<String>, timeout_secs: u64) -> Result<Self, StockcastError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StockcastError::DataSource {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| FMP_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn api_key(&self) -> Result<&str, StockcastError> {
        self.api_key.as_deref().ok_or_else(|| StockcastError::DataSource {
            reason: "FMP API key not configured".into(),
        })
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, StockcastError> {
        let key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "FMP request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("apikey", key)])
            .send()
            .map_err(|e| StockcastError::DataSource {
                reason: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(StockcastError::DataSource {
                reason: format!("FMP API error: {}", response.status()),
            });
        }

        response.text().map_err(|e| StockcastError::DataSource {
            reason: format!("failed to read response: {}", e),
        })
    }
}

/// First element of the quote array, `None` for an empty array or missing price.
pub fn parse_quote(body: &str) -> Result<Option<Quote>, StockcastError> {
    let quotes: Vec<FmpQuote> = serde_json::from_str(body)?;
    let Some(q) = quotes.into_iter().next() else {
        return Ok(None);
    };
    let Some(price) = q.price else {
        return Ok(None);
    };
    let previous_close = q.previous_close.unwrap_or(0.0);
    let mut quote = Quote::from_prices(q.name.unwrap_or_default(), price, previous_close);
    if let Some(pct) = q.changes_percentage {
        quote.change_pct = pct;
    }
    Ok(Some(quote))
}

/// Historical bars oldest first, limited to the most recent `days`.
pub fn parse_history(body: &str, days: usize) -> Result<Vec<OhlcvBar>, StockcastError> {
    // unknown symbols come back as `{}`
    let history: FmpHistory = serde_json::from_str(body)?;
    let mut bars = Vec::with_capacity(history.historical.len());
    for b in history.historical {
        let date = NaiveDate::parse_from_str(&b.date, "%Y-%m-%d").map_err(|e| {
            StockcastError::DataSource {
                reason: format!("invalid date format '{}': {}", b.date, e),
            }
        })?;
        bars.push(OhlcvBar {
            date,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume.map(|v| v as i64),
        });
    }
    Ok(HistorySeries::from_unsorted(bars).tail(days).bars().to_vec())
}

pub fn parse_news(body: &str, limit: usize) -> Result<Vec<NewsItem>, StockcastError> {
    let articles: Vec<FmpNews> = serde_json::from_str(body)?;
    Ok(articles
        .into_iter()
        .take(limit)
        .map(|a| {
            // "2024-03-01 14:30:00" -> "2024-03-01"
            let date = a
                .published_date
                .map(|d| d.chars().take(10).collect::<String>());
            let source = a.site.unwrap_or_else(|| "Financial Modeling Prep".to_string());
            NewsItem::with_defaults(a.title, date, a.url, &source, a.text)
        })
        .collect())
}

impl MarketDataPort for FmpAdapter {
    fn name(&self) -> &str {
        "fmp"
    }

    fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>, StockcastError> {
        let body = self.get(&format!("/api/v3/quote/{}", symbol), &[])?;
        parse_quote(&body)
    }

    fn fetch_history(&self, symbol: &str, days: usize) -> Result<Vec<OhlcvBar>, StockcastError> {
        let to = Local::now().date_naive();
        let from = to - Duration::days(days as i64 + HISTORY_BUFFER_DAYS);
        let body = self.get(
            &format!("/api/v3/historical-price-full/{}", symbol),
            &[
                ("from", from.format("%Y-%m-%d").to_string()),
                ("to", to.format("%Y-%m-%d").to_string()),
            ],
        )?;
        let bars = parse_history(&body, days)?;
        if bars.is_empty() {
            warn!(%symbol, "FMP returned no history");
        }
        Ok(bars)
    }

    fn fetch_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>, StockcastError> {
        let body = self.get(
            "/api/v3/stock_news",
            &[("tickers", symbol.to_string()), ("limit", limit.to_string())],
        )?;
        parse_news(&body, limit)
    }
}
