//! Plain-text and JSON rendering of analysis and portfolio results.

use crate::domain::analysis::{AnalysisResult, CombinedPoint, SeriesKind};
use crate::domain::error::StockcastError;
use crate::domain::indicator::{IndicatorType, DEFAULT_FAST, DEFAULT_SLOW};
use crate::domain::portfolio::PortfolioSummary;
use crate::domain::quote::NewsItem;
use crate::domain::simulation::cumulative_change_pct;
use crate::domain::trend::{Direction, TrendSummary};
use serde::Serialize;

/// JSON document for a single-symbol analysis.
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    #[serde(flatten)]
    pub result: &'a AnalysisResult,
    pub cumulative_change_pct: f64,
    pub series: &'a [CombinedPoint],
}

impl<'a> AnalysisReport<'a> {
    pub fn new(result: &'a AnalysisResult, series: &'a [CombinedPoint]) -> Self {
        Self {
            result,
            cumulative_change_pct: cumulative_change_pct(&result.simulation),
            series,
        }
    }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StockcastError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn direction_label(direction: Direction) -> String {
    match direction {
        Direction::Unknown => "insufficient data".to_string(),
        d => d.to_string(),
    }
}

fn write_trend(out: &mut String, trend: &TrendSummary) {
    out.push_str(&format!("Trend:       {}\n", direction_label(trend.direction)));
    if trend.is_insufficient() {
        return;
    }
    out.push_str(&format!("Strength:    {:.1}/100\n", trend.strength));
    out.push_str(&format!("Support:     {:.2}\n", trend.support_level));
    out.push_str(&format!("Resistance:  {:.2}\n", trend.resistance_level));
    let macd = IndicatorType::Macd {
        fast: DEFAULT_FAST,
        slow: DEFAULT_SLOW,
    };
    out.push_str(&format!("{:<12} {:.1}\n", format!("{}:", IndicatorType::Rsi), trend.momentum.rsi));
    out.push_str(&format!("{:<12} {:.4}\n", format!("{}:", macd), trend.momentum.macd));
}

pub fn render_analysis(result: &AnalysisResult, series: &[CombinedPoint]) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ({}-day outlook) ===\n", result.symbol, result.days));

    match &result.quote {
        Some(q) => {
            let name = if q.name.is_empty() { &result.symbol } else { &q.name };
            out.push_str(&format!(
                "{}: {:.2} ({:+.2}% vs prev close {:.2})\n",
                name, q.price, q.change_pct, q.previous_close
            ));
        }
        None => {
            out.push_str("No quote available.\n");
        }
    }

    if !result.has_data() {
        out.push_str("Not enough data to run a prediction.\n");
        return out;
    }

    out.push('\n');
    out.push_str(&format!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>8}\n",
        "Date", "Open", "High", "Low", "Close", "Change"
    ));
    let predicted = series.iter().filter(|p| p.kind == SeriesKind::Predictive);
    for (point, sim) in predicted.zip(&result.simulation) {
        out.push_str(&format!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>+7.2}%\n",
            point.date, point.open, point.high, point.low, point.close, sim.percentage_change
        ));
    }
    out.push_str(&format!(
        "Cumulative change: {:+.2}%\n",
        cumulative_change_pct(&result.simulation)
    ));
    out.push('\n');
    write_trend(&mut out, &result.trend);
    out
}

pub fn render_portfolio(summary: &PortfolioSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== Portfolio ({} holdings, {}-day outlook) ===\n",
        summary.holdings.len(),
        summary.days
    ));
    out.push_str(&format!("Total value:      {:.2}\n", summary.total_value));
    out.push_str(&format!(
        "Predicted value:  {:.2} ({:+.2}%)\n",
        summary.total_predicted_value, summary.prediction_change_pct
    ));
    out.push_str(&format!("Expected P&L:     {:+.2}\n", summary.expected_pnl));
    out.push_str(&format!("Overall trend:    {}\n", summary.overall_trend));
    if !summary.skipped.is_empty() {
        out.push_str(&format!("Skipped (no data): {}\n", summary.skipped.join(", ")));
    }

    out.push('\n');
    out.push_str("Composition:\n");
    for entry in summary.composition() {
        out.push_str(&format!(
            "  {:<10} {:>12.2} {:>6.1}% {:?}\n",
            entry.symbol, entry.value, entry.weight_pct, entry.side
        ));
    }

    out.push('\n');
    out.push_str("Trend distribution:\n");
    for bucket in summary.trend_distribution() {
        out.push_str(&format!(
            "  {:<18} {:>3} ({:.1}%)\n",
            direction_label(bucket.direction),
            bucket.count,
            bucket.pct
        ));
    }

    out.push('\n');
    out.push_str("Predicted performance:\n");
    for entry in summary.performance_comparison() {
        out.push_str(&format!(
            "  {:<10} {:>+8.2}% {:>+12.2} {}\n",
            entry.symbol,
            entry.predicted_change_pct,
            entry.expected_pnl,
            direction_label(entry.direction)
        ));
    }
    out
}

pub fn render_news(symbol: &str, items: &[NewsItem]) -> String {
    let mut out = String::new();
    if items.is_empty() {
        out.push_str(&format!("No news for {}.\n", symbol));
        return out;
    }
    out.push_str(&format!("=== {} news ===\n", symbol));
    for item in items {
        out.push_str(&format!("{}  {} ({})\n", item.date, item.title, item.source));
        out.push_str(&format!("    {}\n", item.summary));
        out.push_str(&format!("    {}\n", item.url));
    }
    out
}
