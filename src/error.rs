// =============================================================================
// Error taxonomy
// =============================================================================
//
// Only conditions that cross a collaborator boundary are errors.  Short
// history and zero-volatility indicators are ordinary outcomes and are
// modelled as `Assessment::InsufficientHistory` and `None` values instead.

use thiserror::Error;

use crate::types::Interval;

#[derive(Error, Debug)]
pub enum ScanError {
    /// Market data could not be obtained (network, unknown ticker, empty
    /// result, timeout).  The ticker is skipped for this run.
    #[error("no data for {ticker} ({interval}): {reason}")]
    DataUnavailable {
        ticker: String,
        interval: Interval,
        reason: String,
    },

    /// The notification sink rejected or never received a message.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Required run configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ScanError {
    pub fn data_unavailable(
        ticker: impl Into<String>,
        interval: Interval,
        reason: impl Into<String>,
    ) -> Self {
        Self::DataUnavailable {
            ticker: ticker.into(),
            interval,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
