// =============================================================================
// DCA Scanner: Main Entry Point
// =============================================================================
//
// One stateless pass: fetch daily + weekly history for every configured
// ticker, evaluate the StochRSI DCA entry rule, and push the results to a
// Discord webhook.  Scheduling is left to cron / CI.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dca_scanner::config::ScanConfig;
use dca_scanner::market_data::YahooSource;
use dca_scanner::notify::{DiscordSink, LogSink, Sink};
use dca_scanner::scanner::Scanner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── 2. Configuration ─────────────────────────────────────────────────
    let config_path =
        std::env::var("DCA_CONFIG").unwrap_or_else(|_| "scanner_config.json".into());
    let mut config = ScanConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        ScanConfig::default()
    });
    config.apply_overrides(|key| std::env::var(key).ok())?;

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        return Err(e.into());
    }

    info!(
        tickers = ?config.tickers,
        dry_run = config.dry_run,
        confirmed_only = config.confirmed_only,
        "configured scan"
    );

    // ── 3. Collaborators ─────────────────────────────────────────────────
    let source = YahooSource::new(
        config.daily_range.clone(),
        config.weekly_range.clone(),
        config.fetch_timeout(),
    )?;

    let sink = match (&config.webhook_url, config.dry_run) {
        (Some(url), false) => Sink::Discord(DiscordSink::new(url.clone())?),
        _ => Sink::Log(LogSink),
    };

    // ── 4. Cancellation on Ctrl+C (checked between tickers) ──────────────
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("shutdown signal received, finishing in-flight tickers");
            cancel_flag.store(true, Ordering::Relaxed);
        }
    });

    // ── 5. Run ───────────────────────────────────────────────────────────
    let scanner = Scanner::new(config, source, sink);
    let report = scanner.run(&cancel).await;

    match serde_json::to_string(&report) {
        Ok(json) => info!(report = %json, "DCA scan finished"),
        Err(e) => warn!(error = %e, "failed to serialize run report"),
    }
    Ok(())
}
