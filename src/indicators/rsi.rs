// =============================================================================
// Relative Strength Index (RSI): simple-average variant
// =============================================================================
//
// Step 1: delta_i = close_i - close_{i-1}  (undefined for the first bar).
// Step 2: gain_i = max(delta_i, 0),  loss_i = max(-delta_i, 0).
// Step 3: avg_gain / avg_loss = SMA of gain / loss over the trailing
//          `period` deltas (plain rolling mean, not Wilder's smoothing).
// Step 4: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Zero volatility (avg_gain == avg_loss == 0) is 0/0 and yields `None`.
// =============================================================================

use super::rolling::rolling_mean;

/// Compute the RSI column for `closes`, aligned with the input.
///
/// Index `i` is defined once `period` deltas exist, i.e. for `i >= period`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - avg_loss == 0, avg_gain > 0 => 100.0 (RS is infinite)
/// - avg_loss == 0, avg_gain == 0 => `None` (indeterminate)
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    if period == 0 || n == 0 {
        return vec![None; n];
    }

    let mut gains = vec![None; n];
    let mut losses = vec![None; n];
    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        gains[i] = Some(delta.max(0.0));
        losses[i] = Some((-delta).max(0.0));
    }

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    avg_gains
        .into_iter()
        .zip(avg_losses)
        .map(|(g, l)| rsi_from_averages(g?, l?))
        .collect()
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return None;
        }
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}
