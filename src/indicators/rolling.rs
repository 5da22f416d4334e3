// =============================================================================
// Rolling-window helpers over partially defined series
// =============================================================================
//
// Indicator columns are `Vec<Option<f64>>`, aligned 1:1 with the input bars.
// A window statistic is defined only when every value in the trailing window
// is defined, so warm-up and indeterminate values propagate forward as `None`
// instead of NaN.
//
// Each window is reduced from scratch (no running sums) so a value depends
// only on the values inside its window.

/// Apply `reduce` to every full trailing window of `window` defined values.
///
/// Output has the same length as `values`; index `i` is `None` when
/// `i + 1 < window` or any of `values[i + 1 - window ..= i]` is `None`.
pub fn rolling<F>(values: &[Option<f64>], window: usize, reduce: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for i in (window - 1)..values.len() {
        buf.clear();
        buf.extend(values[i + 1 - window..=i].iter().map_while(|v| *v));
        if buf.len() == window {
            out[i] = reduce(&buf);
        }
    }
    out
}

/// Simple moving average.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| Some(w.iter().sum::<f64>() / w.len() as f64))
}

/// Rolling minimum.
pub fn rolling_min(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().reduce(f64::min))
}

/// Rolling maximum.
pub fn rolling_max(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().reduce(f64::max))
}

/// Minimum of the last `window` values ending at `end` (inclusive).
///
/// Returns `None` when fewer than `window` values are available.
pub fn trailing_min(values: &[f64], end: usize, window: usize) -> Option<f64> {
    if window == 0 || end >= values.len() || end + 1 < window {
        return None;
    }
    values[end + 1 - window..=end].iter().copied().reduce(f64::min)
}
