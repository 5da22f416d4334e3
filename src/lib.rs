// =============================================================================
// DCA Scanner
// =============================================================================
//
// Indicator engine and signal evaluator for a dollar-cost-averaging entry
// alert, plus the glue that runs them over a ticker list: a market data
// source, a notification sink, and the scan orchestration.

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod indicators;
pub mod market_data;
pub mod notify;
pub mod scanner;
pub mod types;
