//! Real-time quote snapshot and news items supplied by market data providers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub name: String,
    pub price: f64,
    pub previous_close: f64,
    pub change_pct: f64,
}

impl Quote {
    /// Build a quote, deriving the percentage change from the two prices.
    pub fn from_prices(name: impl Into<String>, price: f64, previous_close: f64) -> Self {
        Self {
            name: name.into(),
            price,
            previous_close,
            change_pct: change_pct(price, previous_close),
        }
    }
}

/// (price - previous_close) / previous_close * 100, 0 when either side is missing.
pub fn change_pct(price: f64, previous_close: f64) -> f64 {
    if price == 0.0 || previous_close == 0.0 {
        0.0
    } else {
        (price - previous_close) / previous_close * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    /// `YYYY-MM-DD`, or `N/A` when the provider gave no publish time.
    pub date: String,
    pub url: String,
    pub source: String,
    pub summary: String,
}

pub const NO_TITLE: &str = "No title available";
pub const NO_SUMMARY: &str = "No summary available";
pub const NO_DATE: &str = "N/A";
pub const NO_URL: &str = "#";

impl NewsItem {
    /// Fill absent or blank fields with the display placeholders.
    pub fn with_defaults(
        title: Option<String>,
        date: Option<String>,
        url: Option<String>,
        source: &str,
        summary: Option<String>,
    ) -> Self {
        fn present(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }
        Self {
            title: present(title).unwrap_or_else(|| NO_TITLE.to_string()),
            date: present(date).unwrap_or_else(|| NO_DATE.to_string()),
            url: present(url).unwrap_or_else(|| NO_URL.to_string()),
            source: source.to_string(),
            summary: present(summary).unwrap_or_else(|| NO_SUMMARY.to_string()),
        }
    }
}
