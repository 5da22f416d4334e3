// =============================================================================
// Scan Configuration: ticker universe, webhook target, fetch limits
// =============================================================================
//
// Loaded once at startup: optional JSON file first, then environment
// overrides.  All fields carry `#[serde(default)]` so a partial (or absent)
// file is fine.  The resulting value is passed explicitly into the scanner.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ScanError;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_tickers() -> Vec<String> {
    [
        "NVDA", "AMZN", "RKLB", "TSM", "LLY", "AVGO", "HIMS", "PLTR", "TMDX", "ASML", "ARQT",
        "V", "META", "ABBV", "COST", "IONQ", "MSFT", "SNOW", "TEM", "VST", "CRWD",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_daily_range() -> String {
    "2y".to_string()
}

fn default_weekly_range() -> String {
    "5y".to_string()
}

fn default_max_concurrency() -> usize {
    4
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

// =============================================================================
// ScanConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Tickers scanned on every run.
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,

    /// Discord incoming-webhook URL.  Required unless `dry_run` is set.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// History range requested for the daily series.
    #[serde(default = "default_daily_range")]
    pub daily_range: String,

    /// History range requested for the weekly series.
    #[serde(default = "default_weekly_range")]
    pub weekly_range: String,

    /// Tickers processed at once; bounded to respect data-source rate limits.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-request deadline for market data.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Log messages instead of posting them.
    #[serde(default)]
    pub dry_run: bool,

    /// Deliver only confirmed signals, suppressing watch-tier ones.
    #[serde(default)]
    pub confirmed_only: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            webhook_url: None,
            daily_range: default_daily_range(),
            weekly_range: default_weekly_range(),
            max_concurrency: default_max_concurrency(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            dry_run: false,
            confirmed_only: false,
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scanner config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse scanner config from {}", path.display()))?;

        info!(
            path = %path.display(),
            tickers = config.tickers.len(),
            "scanner config loaded"
        );

        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = lookup("DCA_TICKERS") {
            self.tickers = parse_ticker_list(&list);
        }
        if let Some(url) = lookup("DISCORD_WEBHOOK_URL").filter(|u| !u.trim().is_empty()) {
            self.webhook_url = Some(url.trim().to_string());
        }
        if let Some(n) = lookup("DCA_MAX_CONCURRENCY") {
            self.max_concurrency = n
                .trim()
                .parse()
                .with_context(|| format!("DCA_MAX_CONCURRENCY is not a number: {n}"))?;
        }
        if let Some(flag) = lookup("DCA_DRY_RUN") {
            self.dry_run = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Startup check; a failure here is the only fatal condition of a run.
    pub fn validate(&self) -> std::result::Result<(), ScanError> {
        if self.tickers.is_empty() {
            return Err(ScanError::Config("ticker list is empty".to_string()));
        }
        if !self.dry_run && self.webhook_url.is_none() {
            return Err(ScanError::Config(
                "DISCORD_WEBHOOK_URL not set (set DCA_DRY_RUN=1 to log messages instead)"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

fn parse_ticker_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
