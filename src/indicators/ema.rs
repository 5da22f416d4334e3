// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Formula:
//   alpha  = 2 / (span + 1)
//   EMA_0  = x_0
//   EMA_t  = alpha * x_t + (1 - alpha) * EMA_{t-1}
//
// Seeded with the first observation (no SMA seed), so the output is defined
// for every input element.  Early values carry warm-up bias.
// =============================================================================

/// Compute the EMA of `values` for the given `span`.
///
/// Output has the same length as the input.
///
/// # Edge cases
/// - empty input => empty vec
/// - `span == 0` => alpha = 2, which is not a smoothing; returns empty vec
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return Vec::new();
    }
    let Some(&first) = values.first() else {
        return Vec::new();
    };

    let alpha = 2.0 / (span as f64 + 1.0);

    let mut result = Vec::with_capacity(values.len());
    let mut prev = first;
    result.push(prev);
    for &x in &values[1..] {
        prev = alpha * x + (1.0 - alpha) * prev;
        result.push(prev);
    }
    result
}
