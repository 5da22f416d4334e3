// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator functions.  Columns that have a warm-up
// period or can become indeterminate are `Vec<Option<f64>>` aligned with the
// input; `None` is the only representation of "undefined" (never NaN).

pub mod ema;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod stoch_rsi;
