//! Calendar dates for simulated periods.
//!
//! Round-the-clock assets (crypto pairs and `.X` tickers) step every calendar
//! day; everything else steps Monday to Friday. Exchange holidays are ignored.

use chrono::{Datelike, NaiveDate, Weekday};

const CONTINUOUS_SUFFIXES: [&str; 2] = [".X", "-USD"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSchedule {
    /// Trades every day of the week.
    Continuous,
    /// Trades Monday to Friday.
    Weekdays,
}

impl MarketSchedule {
    pub fn for_symbol(symbol: &str) -> Self {
        if is_continuous_market(symbol) {
            MarketSchedule::Continuous
        } else {
            MarketSchedule::Weekdays
        }
    }

    pub fn is_trading_day(self, date: NaiveDate) -> bool {
        match self {
            MarketSchedule::Continuous => true,
            MarketSchedule::Weekdays => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }
}

pub fn is_continuous_market(symbol: &str) -> bool {
    let upper = symbol.to_uppercase();
    CONTINUOUS_SUFFIXES.iter().any(|s| upper.ends_with(s))
}

/// The next `count` trading days strictly after `after`.
pub fn future_dates(after: NaiveDate, count: usize, schedule: MarketSchedule) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = after;
    while dates.len() < count {
        current = match current.succ_opt() {
            Some(d) => d,
            None => break,
        };
        if schedule.is_trading_day(current) {
            dates.push(current);
        }
    }
    dates
}
