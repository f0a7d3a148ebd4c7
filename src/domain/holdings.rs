//! Holdings import from broker CSV exports and public portfolio pages.
//!
//! Exports vary by broker, so columns are located by header name with
//! fallbacks, symbols are normalised to plain tickers, and rows that cannot
//! be a ticker are dropped rather than failing the whole import.

use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

const SYMBOL_HEADERS: [&str; 6] = ["symbol", "ticker", "stock", "asset", "instrument", "security"];
const QUANTITY_HEADERS: [&str; 5] = ["units", "amount", "quantity", "shares", "holdings"];
const SIDE_HEADERS: [&str; 4] = ["direction", "side", "position type", "type"];
const MAX_SYMBOL_LEN: usize = 10;

/// Public portfolio pages live under this prefix.
pub const PORTFOLIO_URL_PREFIX: &str = "https://www.etoro.com/people/";
const ASSET_CELL_SELECTOR: &str = "a.user-portfolio-card-table-asset-cell";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
    pub side: PositionSide,
}

impl Holding {
    pub fn long(symbol: &str, quantity: f64) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            quantity,
            side: PositionSide::Long,
        }
    }

    pub fn short(symbol: &str, quantity: f64) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            quantity,
            side: PositionSide::Short,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HoldingsError {
    #[error("holdings file has no header row")]
    MissingHeader,

    #[error("holdings CSV error: {0}")]
    Csv(String),

    #[error("no valid holdings found")]
    Empty,

    #[error("portfolio URL must start with 'https://www.etoro.com/people/': {0}")]
    InvalidUrl(String),

    #[error("holdings HTML error: {0}")]
    Html(String),
}

/// Parse a broker CSV export into holdings, merging repeated symbols.
///
/// Repeated symbols are netted: long quantities add, short quantities
/// subtract, and the sign of the total picks the side. A symbol that nets to
/// zero is dropped. Holdings keep the order in which each symbol first appears.
pub fn parse_holdings_csv(content: &str) -> Result<Vec<Holding>, HoldingsError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| HoldingsError::Csv(e.to_string()))?
        .iter()
        .map(normalise_header)
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(HoldingsError::MissingHeader);
    }

    let symbol_col = find_column(&headers, &SYMBOL_HEADERS).unwrap_or(0);
    let quantity_col = find_column(&headers, &QUANTITY_HEADERS).unwrap_or(1);
    let side_col = find_column(&headers, &SIDE_HEADERS).filter(|&c| c != symbol_col);
    debug!(symbol_col, quantity_col, ?side_col, "holdings columns");

    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();

    for record in rdr.records() {
        let record = record.map_err(|e| HoldingsError::Csv(e.to_string()))?;
        let raw_symbol = match record.get(symbol_col) {
            Some(s) if !s.is_empty() => s,
            _ => continue,
        };
        let symbol = clean_symbol(raw_symbol);
        if !is_valid_symbol(&symbol) {
            debug!(raw = raw_symbol, "skipping non-ticker row");
            continue;
        }

        let quantity = record.get(quantity_col).map(parse_quantity).unwrap_or(1.0);
        let side = side_col
            .and_then(|c| record.get(c))
            .map(parse_side)
            .unwrap_or(PositionSide::Long);

        let signed = quantity * side.sign();
        match totals.get_mut(&symbol) {
            Some(total) => *total += signed,
            None => {
                totals.insert(symbol.clone(), signed);
                order.push(symbol);
            }
        }
    }

    let holdings: Vec<Holding> = order
        .into_iter()
        .filter_map(|symbol| {
            let net = totals.get(&symbol).copied().unwrap_or(0.0);
            if net == 0.0 {
                debug!(%symbol, "dropping position that nets to zero");
                return None;
            }
            let side = if net < 0.0 {
                PositionSide::Short
            } else {
                PositionSide::Long
            };
            Some(Holding {
                symbol,
                quantity: net.abs(),
                side,
            })
        })
        .collect();

    if holdings.is_empty() {
        return Err(HoldingsError::Empty);
    }
    Ok(holdings)
}

/// Holdings listed on a saved public portfolio page.
///
/// Pages list assets but not position sizes, so every asset is a long
/// holding of one unit. Repeated assets appear once.
pub fn parse_holdings_html(html: &str) -> Result<Vec<Holding>, HoldingsError> {
    let selector =
        Selector::parse(ASSET_CELL_SELECTOR).map_err(|e| HoldingsError::Html(e.to_string()))?;
    let document = Html::parse_document(html);

    let mut holdings: Vec<Holding> = Vec::new();
    for cell in document.select(&selector) {
        let text: String = cell.text().collect();
        let symbol = text.trim().to_uppercase();
        if symbol.is_empty() || holdings.iter().any(|h| h.symbol == symbol) {
            continue;
        }
        holdings.push(Holding::long(&symbol, 1.0));
    }
    debug!(count = holdings.len(), "holdings found on portfolio page");

    if holdings.is_empty() {
        return Err(HoldingsError::Empty);
    }
    Ok(holdings)
}

pub fn validate_portfolio_url(url: &str) -> Result<(), HoldingsError> {
    if url.starts_with(PORTFOLIO_URL_PREFIX) {
        Ok(())
    } else {
        Err(HoldingsError::InvalidUrl(url.to_string()))
    }
}

fn normalise_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('"').to_lowercase();
    // merged cells arrive as "units,amount"
    trimmed.split(',').next().unwrap_or("").trim().to_string()
}

/// Exact header match first, then substring match.
fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| candidates.contains(&h.as_str()))
        .or_else(|| {
            headers
                .iter()
                .position(|h| candidates.iter().any(|c| h.contains(c)))
        })
}

/// Upper-case and strip exchange suffixes (`VOD.L` -> `VOD`, `BRK-B` -> `BRK`),
/// keeping crypto pairs such as `BTC-USD` intact.
pub fn clean_symbol(raw: &str) -> String {
    let mut symbol = raw.trim().trim_matches('"').to_uppercase();
    if let Some(idx) = symbol.find('.') {
        symbol.truncate(idx);
    }
    if !symbol.ends_with("-USD") {
        if let Some(idx) = symbol.find('-') {
            symbol.truncate(idx);
        }
    }
    symbol
}

/// Tickers are 1..=10 characters, not purely numeric, with no digit in the first two.
pub fn is_valid_symbol(symbol: &str) -> bool {
    let len = symbol.chars().count();
    if len == 0 || len > MAX_SYMBOL_LEN {
        return false;
    }
    if symbol.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    !symbol.chars().take(2).any(|c| c.is_ascii_digit())
}

/// Quantities may carry thousands separators; anything unparsable counts as 1.
fn parse_quantity(raw: &str) -> f64 {
    raw.trim()
        .trim_matches('"')
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|q| q.is_finite())
        .unwrap_or(1.0)
}

fn parse_side(raw: &str) -> PositionSide {
    if raw.to_uppercase().contains("SHORT") || raw.eq_ignore_ascii_case("sell") {
        PositionSide::Short
    } else {
        PositionSide::Long
    }
}
