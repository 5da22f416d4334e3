// =============================================================================
// Indicator Engine
// =============================================================================
//
// Transforms a raw `PriceSeries` into a `DerivedSeries`: the same bars plus
// StochRSI %K/%D, EMA 50/100/200 and MACD/signal for each bar.  Only rows
// where every indicator is defined are kept as usable rows; evaluation reads
// the last of them.
//
// Pure and deterministic: no I/O, no shared state.

use serde::Serialize;

use crate::indicators::ema::calculate_ema;
use crate::indicators::macd::{calculate_macd, FAST_SPAN, SIGNAL_SPAN, SLOW_SPAN};
use crate::indicators::rsi::calculate_rsi;
use crate::indicators::stoch_rsi::{calculate_stoch_rsi, D_SMOOTHING, K_SMOOTHING, STOCH_WINDOW};
use crate::types::{Interval, PriceBar, PriceSeries};

pub const RSI_PERIOD: usize = 14;
pub const EMA_SPANS: [usize; 3] = [50, 100, 200];

/// Per-bar indicator columns, aligned with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorColumns {
    pub percent_k: Vec<Option<f64>>,
    pub percent_d: Vec<Option<f64>>,
    pub ema50: Vec<f64>,
    pub ema100: Vec<f64>,
    pub ema200: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
}

impl IndicatorColumns {
    pub fn from_closes(closes: &[f64]) -> Self {
        let rsi = calculate_rsi(closes, RSI_PERIOD);
        let stoch = calculate_stoch_rsi(&rsi, STOCH_WINDOW, K_SMOOTHING, D_SMOOTHING);
        let macd = calculate_macd(closes, FAST_SPAN, SLOW_SPAN, SIGNAL_SPAN);
        let [ema50, ema100, ema200] = EMA_SPANS.map(|span| calculate_ema(closes, span));

        Self {
            percent_k: stoch.percent_k,
            percent_d: stoch.percent_d,
            ema50,
            ema100,
            ema200,
            macd: macd.macd,
            macd_signal: macd.signal,
        }
    }

    /// The fully-populated indicator set at bar `i`, if any.
    fn row(&self, i: usize) -> Option<IndicatorSet> {
        let set = IndicatorSet {
            percent_k: self.percent_k[i]?,
            percent_d: self.percent_d[i]?,
            ema50: self.ema50[i],
            ema100: self.ema100[i],
            ema200: self.ema200[i],
            macd: self.macd[i],
            macd_signal: self.macd_signal[i],
        };
        set.is_finite().then_some(set)
    }
}

/// All indicator values for one bar; every field is defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub percent_k: f64,
    pub percent_d: f64,
    pub ema50: f64,
    pub ema100: f64,
    pub ema200: f64,
    pub macd: f64,
    pub macd_signal: f64,
}

impl IndicatorSet {
    fn is_finite(&self) -> bool {
        [
            self.percent_k,
            self.percent_d,
            self.ema50,
            self.ema100,
            self.ema200,
            self.macd,
            self.macd_signal,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// A usable row: a bar together with its complete indicator set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedRow {
    /// Position of the bar in the source series.
    pub index: usize,
    pub bar: PriceBar,
    pub indicators: IndicatorSet,
}

/// A price series plus its usable indicator rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    ticker: String,
    interval: Interval,
    bars: Vec<PriceBar>,
    rows: Vec<DerivedRow>,
}

impl DerivedSeries {
    #[cfg(test)]
    pub(crate) fn from_parts(
        ticker: impl Into<String>,
        interval: Interval,
        bars: Vec<PriceBar>,
        rows: Vec<DerivedRow>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            interval,
            bars,
            rows,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Every source bar, including warm-up bars without a usable row.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Fully-populated rows in bar order.
    pub fn rows(&self) -> &[DerivedRow] {
        &self.rows
    }

    /// The most recent fully-populated row.
    pub fn last(&self) -> Option<&DerivedRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Compute every indicator for `series` and keep the fully-populated rows.
///
/// An empty series yields an empty `DerivedSeries`; short series simply have
/// no usable rows.
pub fn compute_indicators(series: &PriceSeries) -> DerivedSeries {
    let bars = series.bars().to_vec();
    let columns = IndicatorColumns::from_closes(&series.closes());

    let rows = bars
        .iter()
        .enumerate()
        .filter_map(|(index, bar)| {
            columns.row(index).map(|indicators| DerivedRow {
                index,
                bar: *bar,
                indicators,
            })
        })
        .collect();

    DerivedSeries {
        ticker: series.ticker().to_string(),
        interval: series.interval(),
        bars,
        rows,
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Deterministic, choppy price path with a slow drift.
    pub(crate) fn synthetic_bars(n: usize, seed: u64) -> Vec<PriceBar> {
        let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let mut close = 100.0;
        (0..n)
            .map(|i| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let noise = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
                close = (close * (1.0 + 0.03 * noise + 0.0005)).max(1.0);
                PriceBar::new(
                    i as i64 * 86_400,
                    close,
                    close * 1.01,
                    close * 0.99,
                    close,
                )
            })
            .collect()
    }

    /// `bars` with every bar from `from` on pinned to the close of bar `from - 1`.
    pub(crate) fn with_flat_tail(mut bars: Vec<PriceBar>, from: usize) -> Vec<PriceBar> {
        let close = bars[from - 1].close;
        for bar in &mut bars[from..] {
            *bar = PriceBar::new(bar.timestamp, close, close, close, close);
        }
        bars
    }

    fn series_of(bars: Vec<PriceBar>) -> PriceSeries {
        PriceSeries::new("TEST", Interval::Daily, bars)
    }

    #[test]
    fn empty_series_yields_empty_derived() {
        let derived = compute_indicators(&series_of(Vec::new()));
        assert!(derived.is_empty());
        assert!(derived.bars().is_empty());
        assert!(derived.last().is_none());
    }

    #[test]
    fn short_series_has_no_usable_rows() {
        for n in [1, 5, 13, 30] {
            let derived = compute_indicators(&series_of(synthetic_bars(n, 7)));
            assert_eq!(derived.len(), 0, "n={n}");
            assert_eq!(derived.bars().len(), n);
        }
    }

    #[test]
    fn first_usable_row_after_stoch_warm_up() {
        let derived = compute_indicators(&series_of(synthetic_bars(40, 3)));
        let first = derived.rows().first().expect("usable rows");
        assert_eq!(first.index, 31);
        assert!(derived.len() <= derived.bars().len());
    }

    #[test]
    fn last_row_is_most_recent_bar() {
        let bars = synthetic_bars(300, 11);
        let derived = compute_indicators(&series_of(bars.clone()));
        let last = derived.last().expect("usable rows");
        assert_eq!(last.index, 299);
        assert_eq!(last.bar, bars[299]);
    }

    #[test]
    fn flat_tail_falls_back_to_last_defined_bar() {
        // Deltas are zero from bar 280 on; RSI keeps one nonzero delta in its
        // window through bar 292 and is undefined afterwards.
        let bars = with_flat_tail(synthetic_bars(300, 11), 280);
        let derived = compute_indicators(&series_of(bars.clone()));

        assert_eq!(derived.bars().len(), 300);
        let last = derived.last().expect("usable rows");
        assert_eq!(last.index, 292);
        assert_eq!(last.bar, bars[292]);
        assert!(derived.rows().iter().all(|row| row.index <= 292));
        assert_eq!(derived.rows()[derived.len() - 2].index, 291);
    }

    #[test]
    fn stoch_columns_stay_in_unit_range() {
        for seed in 0..8 {
            let bars = synthetic_bars(400, seed);
            let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
            let cols = IndicatorColumns::from_closes(&closes);
            for v in cols.percent_k.iter().chain(&cols.percent_d).flatten() {
                assert!((0.0..=1.0).contains(v), "seed {seed}: {v}");
            }
        }
    }

    #[test]
    fn extreme_moves_stay_in_unit_range() {
        let mut closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        closes.extend((0..50).map(|i| 1e6 / (i as f64 + 1.0)));
        closes.extend((0..50).map(|i| 1e-3 * (i as f64 + 1.0)));
        let cols = IndicatorColumns::from_closes(&closes);
        for v in cols.percent_k.iter().chain(&cols.percent_d).flatten() {
            assert!((0.0..=1.0).contains(v), "{v}");
        }
    }

    #[test]
    fn computation_is_deterministic() {
        let series = series_of(synthetic_bars(320, 5));
        let a = compute_indicators(&series);
        let b = compute_indicators(&series);
        assert_eq!(a, b);
        for (x, y) in a.rows().iter().zip(b.rows()) {
            assert_eq!(x.indicators.percent_k.to_bits(), y.indicators.percent_k.to_bits());
            assert_eq!(x.indicators.ema200.to_bits(), y.indicators.ema200.to_bits());
            assert_eq!(x.indicators.macd_signal.to_bits(), y.indicators.macd_signal.to_bits());
        }
    }

    #[test]
    fn constant_price_series() {
        let bars: Vec<PriceBar> = (0..300)
            .map(|i| PriceBar::new(i * 86_400, 100.0, 100.0, 100.0, 100.0))
            .collect();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let cols = IndicatorColumns::from_closes(&closes);

        assert!(cols.percent_k.iter().all(Option::is_none));
        assert!(cols.percent_d.iter().all(Option::is_none));
        for ema in [&cols.ema50, &cols.ema100, &cols.ema200] {
            assert!((ema[299] - 100.0).abs() < 1e-9);
        }
        assert!(cols.macd[299].abs() < 1e-9);
        assert!(cols.macd_signal[299].abs() < 1e-9);

        assert!(compute_indicators(&series_of(bars)).is_empty());
    }

    #[test]
    fn rising_series_emas_are_monotone() {
        let closes: Vec<f64> = (0..300).map(|i| 50.0 + 0.5 * i as f64).collect();
        let cols = IndicatorColumns::from_closes(&closes);
        for ema in [&cols.ema50, &cols.ema100, &cols.ema200] {
            assert!(ema.windows(2).all(|w| w[1] >= w[0]));
        }
    }

    #[test]
    fn tail_is_reproduced_from_a_shorter_window() {
        let bars = synthetic_bars(1200, 21);
        let full = compute_indicators(&series_of(bars.clone()));

        // Recompute on the last 800 bars: stoch columns depend only on a
        // fixed trailing window and match exactly; EMA seeds have decayed.
        let offset = 400;
        let window = compute_indicators(&series_of(bars[offset..].to_vec()));
        let tail = 50;

        let full_tail = &full.rows()[full.len() - tail..];
        let window_tail = &window.rows()[window.len() - tail..];
        for (a, b) in full_tail.iter().zip(window_tail) {
            assert_eq!(a.index, b.index + offset);
            assert!((a.indicators.percent_k - b.indicators.percent_k).abs() < 1e-9);
            assert!((a.indicators.percent_d - b.indicators.percent_d).abs() < 1e-9);
            let rel = |x: f64, y: f64| ((x - y) / x).abs();
            assert!(rel(a.indicators.ema50, b.indicators.ema50) < 1e-6);
            assert!(rel(a.indicators.ema100, b.indicators.ema100) < 1e-3);
            assert!(rel(a.indicators.ema200, b.indicators.ema200) < 5e-2);
        }
    }
}
