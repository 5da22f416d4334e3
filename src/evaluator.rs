// =============================================================================
// Signal Evaluator: daily StochRSI DCA entry with weekly MACD confirmation
// =============================================================================
//
// Evaluated on the last usable row of each timeframe:
//
//   gate       = %K > %D  AND  %K < 0.2  AND  %D < 0.2          (daily)
//   trend_tf   = Up if macd > signal else Down                  (daily, weekly)
//   ema_stack  = EMA50 > EMA100 > close > EMA200                (daily)
//   support_n  = min(low) over the trailing n daily bars, n in {14, 30, 90}
//
//   qualifies  = gate AND trend_day == Up AND trend_week == Up AND ema_stack
//
// Nothing is emitted unless the gate holds.  A gated signal that does not
// qualify is a WATCH; one that qualifies is CONFIRMED.  All comparisons are
// strict so flat data never triggers.

use serde::Serialize;
use tracing::debug;

use crate::engine::{DerivedRow, DerivedSeries};
use crate::indicators::rolling::trailing_min;
use crate::types::{Interval, Trend};

/// Upper bound (exclusive) for %K and %D in the oversold gate.
pub const OVERSOLD_LEVEL: f64 = 0.2;
pub const SUPPORT_WINDOWS: [usize; 3] = [14, 30, 90];

/// Rolling minimum of `low` over the trailing 14/30/90 daily bars.
///
/// `None` when fewer bars than the window exist up to the evaluated bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SupportLevels {
    pub window14: Option<f64>,
    pub window30: Option<f64>,
    pub window90: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalTier {
    /// Oversold gate only.
    Watch,
    /// Gate plus both MACD trends up and a healthy EMA stack.
    Confirmed,
}

impl std::fmt::Display for SignalTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Watch => write!(f, "WATCH"),
            Self::Confirmed => write!(f, "CONFIRMED"),
        }
    }
}

/// Outcome of evaluating one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalResult {
    pub ticker: String,
    /// Timestamp of the evaluated daily bar.
    pub timestamp: i64,
    pub close: f64,
    pub percent_k: f64,
    pub percent_d: f64,
    pub stoch_condition: bool,
    pub macd_day_trend: Trend,
    pub macd_week_trend: Trend,
    pub ema_ordered: bool,
    pub support_levels: SupportLevels,
    pub qualifies: bool,
}

impl SignalResult {
    pub fn tier(&self) -> SignalTier {
        if self.qualifies {
            SignalTier::Confirmed
        } else {
            SignalTier::Watch
        }
    }
}

/// Why a ticker did or did not produce a signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    /// A timeframe has no fully-populated indicator row.
    InsufficientHistory { interval: Interval },
    /// Data was complete but the oversold gate failed.
    NotTriggered,
    Signal(SignalResult),
}

impl Assessment {
    pub fn into_signal(self) -> Option<SignalResult> {
        match self {
            Self::Signal(signal) => Some(signal),
            _ => None,
        }
    }
}

/// Evaluate the rule; `None` when there is no signal for any reason.
pub fn evaluate(day: &DerivedSeries, week: &DerivedSeries, ticker: &str) -> Option<SignalResult> {
    assess(day, week, ticker).into_signal()
}

/// Evaluate the rule and report why no signal was produced.
pub fn assess(day: &DerivedSeries, week: &DerivedSeries, ticker: &str) -> Assessment {
    let Some(day_row) = day.last() else {
        return Assessment::InsufficientHistory {
            interval: day.interval(),
        };
    };
    let Some(week_row) = week.last() else {
        return Assessment::InsufficientHistory {
            interval: week.interval(),
        };
    };

    let d = &day_row.indicators;
    let stoch_condition = stoch_gate(d.percent_k, d.percent_d);
    if !stoch_condition {
        debug!(
            ticker,
            percent_k = d.percent_k,
            percent_d = d.percent_d,
            "stochastic gate not met"
        );
        return Assessment::NotTriggered;
    }

    let macd_day_trend = macd_trend(day_row);
    let macd_week_trend = macd_trend(week_row);
    let ema_ordered = ema_stack_ordered(day_row);
    let support_levels = support_levels(day, day_row.index);

    let qualifies = stoch_condition
        && macd_day_trend == Trend::Up
        && macd_week_trend == Trend::Up
        && ema_ordered;

    debug!(
        ticker,
        day_trend = %macd_day_trend,
        week_trend = %macd_week_trend,
        ema_ordered,
        qualifies,
        "stochastic gate met"
    );

    Assessment::Signal(SignalResult {
        ticker: ticker.to_string(),
        timestamp: day_row.bar.timestamp,
        close: day_row.bar.close,
        percent_k: d.percent_k,
        percent_d: d.percent_d,
        stoch_condition,
        macd_day_trend,
        macd_week_trend,
        ema_ordered,
        support_levels,
        qualifies,
    })
}

fn stoch_gate(k: f64, d: f64) -> bool {
    k > d && k < OVERSOLD_LEVEL && d < OVERSOLD_LEVEL
}

fn macd_trend(row: &DerivedRow) -> Trend {
    if row.indicators.macd > row.indicators.macd_signal {
        Trend::Up
    } else {
        Trend::Down
    }
}

fn ema_stack_ordered(row: &DerivedRow) -> bool {
    let i = &row.indicators;
    let close = row.bar.close;
    i.ema50 > i.ema100 && i.ema100 > close && close > i.ema200
}

fn support_levels(day: &DerivedSeries, end: usize) -> SupportLevels {
    let lows: Vec<f64> = day.bars().iter().map(|b| b.low).collect();
    let [window14, window30, window90] =
        SUPPORT_WINDOWS.map(|window| trailing_min(&lows, end, window));
    SupportLevels {
        window14,
        window30,
        window90,
    }
}
