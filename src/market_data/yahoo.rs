// =============================================================================
// Yahoo Finance chart API: daily / weekly OHLC bars
// =============================================================================
//
// GET {base}/v8/finance/chart/{ticker}?interval={1d|1wk}&range={2y|5y}
//
// The response carries parallel arrays: `timestamp[]` and
// `indicators.quote[0].{open,high,low,close}[]`, where any element may be
// null (halted sessions, the still-forming bar).  Null rows are skipped.
// =============================================================================

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::MarketDataSource;
use crate::error::{Result, ScanError};
use crate::types::{Interval, PriceBar, PriceSeries};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
/// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) dca-scanner/1.0";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Market data source backed by the public Yahoo Finance chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooSource {
    base_url: String,
    daily_range: String,
    weekly_range: String,
    client: reqwest::Client,
}

impl YahooSource {
    /// `daily_range` / `weekly_range` are chart-API ranges such as "2y".
    pub fn new(
        daily_range: impl Into<String>,
        weekly_range: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build market data HTTP client")?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            daily_range: daily_range.into(),
            weekly_range: weekly_range.into(),
            client,
        })
    }

    fn range(&self, interval: Interval) -> &str {
        match interval {
            Interval::Daily => &self.daily_range,
            Interval::Weekly => &self.weekly_range,
        }
    }
}

impl MarketDataSource for YahooSource {
    #[instrument(skip(self), name = "yahoo::fetch")]
    async fn fetch(&self, ticker: &str, interval: Interval) -> Result<PriceSeries> {
        let unavailable = |reason: String| ScanError::data_unavailable(ticker, interval, reason);

        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let resp = self
            .client
            .get(&url)
            .query(&[("interval", interval.as_query()), ("range", self.range(interval))])
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| unavailable(format!("failed to read body: {e}")))?;

        // Unknown tickers come back as 404 with a JSON error envelope.
        let parsed: ChartResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(unavailable(format!("malformed chart response: {e}")))
            }
            Err(_) => return Err(unavailable(format!("HTTP {status}"))),
        };

        let series = parse_chart(ticker, interval, parsed).map_err(unavailable)?;
        if series.is_empty() {
            return Err(unavailable("empty result".to_string()));
        }

        info!(
            ticker,
            interval = %interval,
            range = self.range(interval),
            rows = series.len(),
            "fetched price history"
        );
        Ok(series)
    }
}

fn parse_chart(
    ticker: &str,
    interval: Interval,
    response: ChartResponse,
) -> std::result::Result<PriceSeries, String> {
    if let Some(err) = response.chart.error {
        return Err(format!("{}: {}", err.code, err.description));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| "chart response has no result".to_string())?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let field = |col: &[Option<f64>]| col.get(i).copied().flatten();
        match (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) {
            (Some(open), Some(high), Some(low), Some(close)) => {
                bars.push(PriceBar::new(ts, open, high, low, close));
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(ticker, interval = %interval, skipped, "skipping chart rows with null prices");
    }

    Ok(PriceSeries::new(ticker, interval, bars))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> std::result::Result<PriceSeries, String> {
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        parse_chart("NVDA", Interval::Daily, response)
    }

    #[test]
    fn parses_bars_and_skips_nulls() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": { "symbol": "NVDA" },
                    "timestamp": [100, 200, 300],
                    "indicators": { "quote": [{
                        "open":  [1.0, null, 3.0],
                        "high":  [1.5, 2.5, 3.5],
                        "low":   [0.5, 1.5, 2.5],
                        "close": [1.2, 2.2, 3.2],
                        "volume": [10, 20, 30]
                    }]}
                }],
                "error": null
            }
        }"#;
        let series = parse(json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].timestamp, 100);
        assert_eq!(series.bars()[1].timestamp, 300);
        assert!((series.bars()[1].close - 3.2).abs() < 1e-12);
        assert_eq!(series.ticker(), "NVDA");
    }

    #[test]
    fn chart_error_is_reported() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }"#;
        let err = parse(json).unwrap_err();
        assert!(err.contains("Not Found"));
    }

    #[test]
    fn missing_quote_block_yields_empty_series() {
        let json = r#"{
            "chart": {
                "result": [{ "timestamp": [100], "indicators": { "quote": [] } }],
                "error": null
            }
        }"#;
        assert!(parse(json).unwrap().is_empty());
    }

    #[test]
    fn short_price_columns_do_not_panic() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [100, 200],
                    "indicators": { "quote": [{
                        "open": [1.0], "high": [1.5], "low": [0.5], "close": [1.2]
                    }]}
                }]
            }
        }"#;
        assert_eq!(parse(json).unwrap().len(), 1);
    }
}
