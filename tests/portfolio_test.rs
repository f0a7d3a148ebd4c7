//! Holdings import and portfolio aggregation end to end.

mod common;

use approx::assert_relative_eq;
use common::*;
use stockcast::domain::holdings::{parse_holdings_csv, PositionSide};
use stockcast::domain::portfolio::{analyze_portfolio, PortfolioOptions};
use stockcast::domain::trend::Direction;

fn falling_closes() -> Vec<f64> {
    (0..20).map(|i| 300.0 - 3.0 * i as f64).collect()
}

fn port() -> MockMarketData {
    MockMarketData::new()
        .with_closes("AAPL", date(2024, 1, 2), &linear_closes())
        .with_closes("MSFT", date(2024, 1, 2), &linear_closes())
        .with_closes("TSLA", date(2024, 1, 2), &falling_closes())
        .with_error("GME", "delisted")
}

fn options() -> PortfolioOptions {
    PortfolioOptions {
        days: 5,
        seed: Some(2024),
        ..PortfolioOptions::default()
    }
}

const EXPORT: &str = "\
Instrument,Units,Direction
AAPL.US,10,Buy
msft,\"1,000\",Buy
TSLA,4,Short
GME,2,Buy
12345,9,Buy
";

#[test]
fn broker_export_to_summary() {
    let holdings = parse_holdings_csv(EXPORT).unwrap();
    assert_eq!(holdings.len(), 4);
    assert_eq!(holdings[0].symbol, "AAPL");
    assert_eq!(holdings[1].quantity, 1000.0);
    assert_eq!(holdings[2].side, PositionSide::Short);

    let summary = analyze_portfolio(&holdings, &port(), &options()).unwrap();
    assert_eq!(summary.holdings.len(), 3);
    assert_eq!(summary.skipped, vec!["GME".to_string()]);

    let expected_total = 119.0 * 10.0 + 119.0 * 1000.0 + 243.0 * 4.0;
    assert_relative_eq!(summary.total_value, expected_total, epsilon = 1e-6);

    let tsla = summary.holdings.iter().find(|h| h.symbol == "TSLA").unwrap();
    assert!(tsla.current_value < 0.0);
    assert_relative_eq!(
        tsla.expected_pnl,
        -(tsla.predicted_price - tsla.current_price) * 4.0,
        epsilon = 1e-9
    );
}

#[test]
fn zero_draw_trends_feed_overall_direction() {
    let holdings = parse_holdings_csv("symbol,shares\nAAPL,1\nMSFT,1\nTSLA,1\n").unwrap();
    let summary = analyze_portfolio(&holdings, &port(), &options()).unwrap();

    let up = summary.count(Direction::Upward);
    let down = summary.count(Direction::Downward);
    let side = summary.count(Direction::Sideways);
    assert_eq!(up + down + side + summary.count(Direction::Unknown), 3);

    let pct = summary.trend_pct;
    assert_relative_eq!(
        pct.upward + pct.downward + pct.sideways + pct.unknown,
        100.0,
        epsilon = 1e-9
    );
}

#[test]
fn same_seed_reproduces_summary() {
    let holdings = parse_holdings_csv("symbol,shares\nAAPL,1\nTSLA,2\n").unwrap();
    let a = analyze_portfolio(&holdings, &port(), &options()).unwrap();
    let b = analyze_portfolio(&holdings, &port(), &options()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn parallel_flag_gives_same_result() {
    let holdings = parse_holdings_csv("symbol,shares\nAAPL,1\nMSFT,3\nTSLA,2\n").unwrap();
    let sequential = analyze_portfolio(&holdings, &port(), &options()).unwrap();
    let parallel = analyze_portfolio(
        &holdings,
        &port(),
        &PortfolioOptions {
            parallel: true,
            ..options()
        },
    )
    .unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn performance_ranking_is_descending() {
    let holdings = parse_holdings_csv("symbol,shares\nAAPL,1\nMSFT,3\nTSLA,2\n").unwrap();
    let summary = analyze_portfolio(&holdings, &port(), &options()).unwrap();
    let ranked = summary.performance_comparison();
    assert!(ranked
        .windows(2)
        .all(|w| w[0].predicted_change_pct >= w[1].predicted_change_pct));
    let composition = summary.composition();
    assert!(composition.windows(2).all(|w| w[0].value >= w[1].value));
}
