//! Exponential Moving Average.
//!
//! alpha = 2/(span+1), EMA[0] = C[0], then EMA[i] = C[i]*alpha + EMA[i-1]*(1-alpha).
//! No warmup: every position carries a value.

pub fn calculate_ema(closes: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || closes.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut values = Vec::with_capacity(closes.len());
    let mut ema = closes[0];
    values.push(ema);

    for &close in &closes[1..] {
        ema = close * alpha + ema * (1.0 - alpha);
        values.push(ema);
    }

    values
}
