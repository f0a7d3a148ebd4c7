//! Momentum indicators over close-price slices.
//!
//! - `ema`: exponential moving average seeded from the first observation
//! - `rsi`: aggregate gain/loss relative strength over a whole window
//! - `macd`: difference of a fast and a slow EMA

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::calculate_ema;
pub use macd::{macd_last, DEFAULT_FAST, DEFAULT_SLOW};
pub use rsi::{calculate_rsi, NEUTRAL_RSI};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi,
    Macd { fast: usize, slow: usize },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(span) => write!(f, "EMA({})", span),
            IndicatorType::Rsi => write!(f, "RSI"),
            IndicatorType::Macd { fast, slow } => write!(f, "MACD({},{})", fast, slow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_ema() {
        assert_eq!(IndicatorType::Ema(12).to_string(), "EMA(12)");
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
        };
        assert_eq!(macd.to_string(), "MACD(12,26)");
    }

    #[test]
    fn indicator_type_display_rsi() {
        assert_eq!(IndicatorType::Rsi.to_string(), "RSI");
    }
}
