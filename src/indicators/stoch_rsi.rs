// =============================================================================
// Stochastic RSI: %K / %D
// =============================================================================
//
// stoch = (rsi - min_n(rsi)) / (max_n(rsi) - min_n(rsi)),  clamped to [0, 1]
// %K    = SMA_k(stoch)
// %D    = SMA_d(%K)
//
// A flat RSI window (max == min) has no defined position inside its range and
// yields `None`, which then flows through both smoothing stages.

use super::rolling::{rolling_max, rolling_mean, rolling_min};

pub const STOCH_WINDOW: usize = 14;
pub const K_SMOOTHING: usize = 3;
pub const D_SMOOTHING: usize = 3;

/// %K and %D columns, aligned with the RSI input.
#[derive(Debug, Clone, PartialEq)]
pub struct StochRsi {
    pub percent_k: Vec<Option<f64>>,
    pub percent_d: Vec<Option<f64>>,
}

/// Compute stochastic RSI from an RSI column.
pub fn calculate_stoch_rsi(
    rsi: &[Option<f64>],
    window: usize,
    k_smoothing: usize,
    d_smoothing: usize,
) -> StochRsi {
    let lows = rolling_min(rsi, window);
    let highs = rolling_max(rsi, window);

    let stoch: Vec<Option<f64>> = rsi
        .iter()
        .zip(lows.iter().zip(&highs))
        .map(|(value, (low, high))| stoch_position((*value)?, (*low)?, (*high)?))
        .collect();

    let percent_k = clamp_unit(rolling_mean(&stoch, k_smoothing));
    let percent_d = clamp_unit(rolling_mean(&percent_k, d_smoothing));

    StochRsi {
        percent_k,
        percent_d,
    }
}

fn stoch_position(value: f64, low: f64, high: f64) -> Option<f64> {
    let range = high - low;
    if range == 0.0 {
        return None;
    }
    let pos = (value - low) / range;
    pos.is_finite().then(|| pos.clamp(0.0, 1.0))
}

fn clamp_unit(values: Vec<Option<f64>>) -> Vec<Option<f64>> {
    values
        .into_iter()
        .map(|v| v.map(|x| x.clamp(0.0, 1.0)))
        .collect()
}
