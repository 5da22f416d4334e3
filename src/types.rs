// =============================================================================
// Shared types used across the DCA scanner
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Sampling granularity of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    Daily,
    Weekly,
}

impl Interval {
    /// Interval code understood by the chart API ("1d" / "1wk").
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Daily => "1d",
            Self::Weekly => "1wk",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly => write!(f, "Weekly"),
        }
    }
}

/// MACD direction on one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "Up"),
            Self::Down => write!(f, "Down"),
        }
    }
}

/// One sampling interval of market data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Bar open time, UNIX seconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// All prices finite and `high >= low`.
    pub fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
            && self.high >= self.low
    }
}

/// Ordered bars for one ticker and interval.
///
/// Timestamps are strictly increasing; the constructor enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    interval: Interval,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from raw bars.
    ///
    /// Malformed bars (non-finite prices, `high < low`) are dropped with a
    /// warning. The remainder is sorted by timestamp and de-duplicated; when
    /// two bars share a timestamp the later one in the input wins.
    pub fn new(ticker: impl Into<String>, interval: Interval, bars: Vec<PriceBar>) -> Self {
        let ticker = ticker.into();
        let total = bars.len();

        let mut bars: Vec<PriceBar> = bars.into_iter().filter(PriceBar::is_well_formed).collect();
        if bars.len() < total {
            warn!(
                ticker = %ticker,
                interval = %interval,
                dropped = total - bars.len(),
                "dropping malformed price bars"
            );
        }

        // Stable sort keeps input order among equal timestamps, so reversing
        // before dedup keeps the last occurrence.
        bars.sort_by_key(|b| b.timestamp);
        bars.reverse();
        bars.dedup_by_key(|b| b.timestamp);
        bars.reverse();

        Self {
            ticker,
            interval,
            bars,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
