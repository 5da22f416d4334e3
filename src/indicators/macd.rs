// =============================================================================
// MACD: Moving Average Convergence Divergence
// =============================================================================
//
//   macd   = EMA_fast(close) - EMA_slow(close)
//   signal = EMA_signal(macd)
//
// Both lines are defined for every bar (EMAs are seeded with the first close).

use super::ema::calculate_ema;

pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    let macd: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal = calculate_ema(&macd, signal);

    Macd { macd, signal }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_empty_input() {
        let out = calculate_macd(&[], FAST_SPAN, SLOW_SPAN, SIGNAL_SPAN);
        assert!(out.macd.is_empty());
        assert!(out.signal.is_empty());
    }

    #[test]
    fn macd_starts_at_zero() {
        let out = calculate_macd(&[50.0, 51.0, 52.0], FAST_SPAN, SLOW_SPAN, SIGNAL_SPAN);
        assert_eq!(out.macd.len(), 3);
        assert_eq!(out.macd[0], 0.0);
        assert_eq!(out.signal[0], 0.0);
    }

    #[test]
    fn macd_positive_and_above_signal_in_uptrend() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let out = calculate_macd(&closes, FAST_SPAN, SLOW_SPAN, SIGNAL_SPAN);
        let last = closes.len() - 1;
        assert!(out.macd[last] > 0.0);
        assert!(out.macd[last] > out.signal[last]);
    }

    #[test]
    fn macd_flat_input_is_zero() {
        let out = calculate_macd(&vec![100.0; 300], FAST_SPAN, SLOW_SPAN, SIGNAL_SPAN);
        assert!(out.macd.iter().chain(&out.signal).all(|v| v.abs() < 1e-9));
    }
}
