// =============================================================================
// Scanner: one stateless batch pass over the ticker universe
// =============================================================================
//
// Per ticker:
//   1. fetch daily + weekly bars concurrently, each under a timeout
//   2. compute both derived series concurrently on the blocking pool
//   3. assess the rule once both are ready
//
// Tickers run through a bounded worker pool.  Signals are collected while
// tickers are in flight and delivered one at a time once the pool drains, so
// sink latency never counts against fetch timeouts.  A run with no signals
// ends with a single summary message.  The cancel flag is checked at every
// ticker boundary.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{stream, StreamExt};
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::ScanConfig;
use crate::engine::{compute_indicators, DerivedSeries};
use crate::error::{Result, ScanError};
use crate::evaluator::{assess, Assessment, SignalResult, SignalTier};
use crate::market_data::MarketDataSource;
use crate::notify::{format_signal, NotificationSink, NO_SIGNAL_MESSAGE};
use crate::types::{Interval, PriceSeries};

/// What happened to one ticker during a run.
#[derive(Debug)]
enum TickerOutcome {
    Cancelled,
    NoData,
    Assessed(Assessment),
}

/// Counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub scanned: usize,
    pub skipped_no_data: usize,
    pub insufficient_history: usize,
    pub not_triggered: usize,
    pub signals: usize,
    pub confirmed: usize,
    /// Watch signals withheld by `confirmed_only`.
    pub suppressed: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
    pub cancelled: usize,
}

pub struct Scanner<S, N> {
    config: ScanConfig,
    source: S,
    sink: N,
}

impl<S, N> Scanner<S, N>
where
    S: MarketDataSource + Sync,
    N: NotificationSink + Sync,
{
    pub fn new(config: ScanConfig, source: S, sink: N) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    /// Scan every configured ticker once.
    pub async fn run(&self, cancel: &AtomicBool) -> RunReport {
        let run_id = uuid::Uuid::new_v4();
        let span = info_span!("scan_run", %run_id);
        self.run_inner(cancel).instrument(span).await
    }

    async fn run_inner(&self, cancel: &AtomicBool) -> RunReport {
        info!(
            tickers = self.config.tickers.len(),
            concurrency = self.config.concurrency(),
            "scan run starting"
        );

        let mut report = RunReport::default();
        let mut pending: Vec<SignalResult> = Vec::new();
        let mut outcomes = stream::iter(self.config.tickers.iter())
            .map(|ticker| async move {
                let outcome = self.scan_ticker(ticker, cancel).await;
                (ticker, outcome)
            })
            .buffer_unordered(self.config.concurrency());

        while let Some((ticker, outcome)) = outcomes.next().await {
            match outcome {
                TickerOutcome::Cancelled => report.cancelled += 1,
                TickerOutcome::NoData => report.skipped_no_data += 1,
                TickerOutcome::Assessed(assessment) => {
                    report.scanned += 1;
                    match assessment {
                        Assessment::InsufficientHistory { interval } => {
                            debug!(ticker = %ticker, %interval, "insufficient history");
                            report.insufficient_history += 1;
                        }
                        Assessment::NotTriggered => report.not_triggered += 1,
                        Assessment::Signal(signal) => {
                            report.signals += 1;
                            if signal.qualifies {
                                report.confirmed += 1;
                            }
                            pending.push(signal);
                        }
                    }
                }
            }
        }

        for signal in &pending {
            self.publish(signal, &mut report).await;
        }

        let was_cancelled = cancel.load(Ordering::Relaxed);
        if report.signals == report.suppressed && !was_cancelled {
            self.send(NO_SIGNAL_MESSAGE, &mut report).await;
        }

        info!(
            scanned = report.scanned,
            skipped = report.skipped_no_data,
            signals = report.signals,
            confirmed = report.confirmed,
            delivered = report.delivered,
            delivery_failures = report.delivery_failures,
            cancelled = report.cancelled,
            "scan run complete"
        );
        report
    }

    async fn scan_ticker(&self, ticker: &str, cancel: &AtomicBool) -> TickerOutcome {
        if cancel.load(Ordering::Relaxed) {
            return TickerOutcome::Cancelled;
        }

        let (day, week) = tokio::join!(
            self.fetch_with_timeout(ticker, Interval::Daily),
            self.fetch_with_timeout(ticker, Interval::Weekly),
        );
        let (day, week) = match (day, week) {
            (Ok(day), Ok(week)) => (day, week),
            (Err(e), _) | (_, Err(e)) => {
                warn!(ticker, error = %e, "skipping ticker");
                return TickerOutcome::NoData;
            }
        };

        let Some((day, week)) = derive_both(day, week).await else {
            return TickerOutcome::NoData;
        };
        debug!(
            ticker = day.ticker(),
            day_bars = day.bars().len(),
            day_rows = day.len(),
            week_rows = week.len(),
            "indicators computed"
        );
        TickerOutcome::Assessed(assess(&day, &week, ticker))
    }

    async fn fetch_with_timeout(&self, ticker: &str, interval: Interval) -> Result<PriceSeries> {
        let limit: Duration = self.config.fetch_timeout();
        match tokio::time::timeout(limit, self.source.fetch(ticker, interval)).await {
            Ok(result) => result,
            Err(_) => Err(ScanError::data_unavailable(
                ticker,
                interval,
                format!("timed out after {}s", limit.as_secs()),
            )),
        }
    }

    async fn publish(&self, signal: &SignalResult, report: &mut RunReport) {
        if self.config.confirmed_only && signal.tier() == SignalTier::Watch {
            debug!(ticker = %signal.ticker, "watch signal suppressed (confirmed_only)");
            report.suppressed += 1;
            return;
        }
        info!(ticker = %signal.ticker, tier = %signal.tier(), "signal found");
        self.send(&format_signal(signal), report).await;
    }

    async fn send(&self, message: &str, report: &mut RunReport) {
        match self.sink.deliver(message).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                error!(error = %e, "failed to deliver message");
                report.delivery_failures += 1;
            }
        }
    }
}

/// Compute daily and weekly indicators concurrently on the blocking pool.
async fn derive_both(day: PriceSeries, week: PriceSeries) -> Option<(DerivedSeries, DerivedSeries)> {
    let day_task = tokio::task::spawn_blocking(move || compute_indicators(&day));
    let week_task = tokio::task::spawn_blocking(move || compute_indicators(&week));

    match tokio::join!(day_task, week_task) {
        (Ok(day), Ok(week)) => Some((day, week)),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "indicator task failed");
            None
        }
    }
}
