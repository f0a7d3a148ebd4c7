//! RSI (Relative Strength Index) over a whole price window.
//!
//! gains = sum of positive first differences, losses = sum of |negative| ones.
//! RSI = 100 - 100 / (1 + gains / losses); RSI = 100 when losses == 0.
//! Fewer than two prices carry no momentum and yield the neutral 50.

pub const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return NEUTRAL_RSI;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for w in closes.windows(2) {
        let change = w[1] - w[0];
        if change > 0.0 {
            gains += change;
        } else if change < 0.0 {
            losses -= change;
        }
    }

    if losses == 0.0 {
        100.0
    } else {
        let rs = gains / losses;
        (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
    }
}
