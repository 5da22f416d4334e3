pub mod yahoo;

use std::future::Future;

use crate::error::Result;
use crate::types::{Interval, PriceSeries};

pub use yahoo::YahooSource;

/// Provider of historical OHLC bars.
///
/// Any failure (network, unknown ticker, empty result) is reported as
/// `ScanError::DataUnavailable`; callers skip the ticker for the run.
pub trait MarketDataSource {
    fn fetch(
        &self,
        ticker: &str,
        interval: Interval,
    ) -> impl Future<Output = Result<PriceSeries>> + Send;
}
