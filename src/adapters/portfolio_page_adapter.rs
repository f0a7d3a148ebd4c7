//! Holdings import from a public portfolio page over HTTP.

use crate::domain::error::StockcastError;
use crate::domain::holdings::{parse_holdings_html, validate_portfolio_url, Holding};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use tracing::debug;

const BROWSER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0 Safari/537.36";

pub struct PortfolioPageAdapter {
    client: Client,
}

impl PortfolioPageAdapter {
    pub fn new(timeout_secs: u64) -> Result<Self, StockcastError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StockcastError::DataSource {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    /// Download the page and read the listed assets as holdings.
    pub fn fetch_holdings(&self, url: &str) -> Result<Vec<Holding>, StockcastError> {
        validate_portfolio_url(url)?;
        debug!(%url, "portfolio page request");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_AGENT)
            .send()
            .map_err(|e| StockcastError::DataSource {
                reason: format!("request failed: {}", e),
            })?;

        if let Some(reason) = status_error(response.status().as_u16()) {
            return Err(StockcastError::DataSource { reason });
        }

        let body = response.text().map_err(|e| StockcastError::DataSource {
            reason: format!("failed to read response: {}", e),
        })?;
        Ok(parse_holdings_html(&body)?)
    }
}

/// Message for a page status that carries no portfolio.
pub fn status_error(status: u16) -> Option<String> {
    match status {
        200 => None,
        404 => Some("portfolio not found, check the URL".into()),
        403 => Some("access denied, the portfolio must be public".into()),
        other => Some(format!("portfolio page returned status {}", other)),
    }
}
