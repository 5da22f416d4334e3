// =============================================================================
// Message formatting
// =============================================================================

use chrono::DateTime;

use crate::evaluator::SignalResult;

pub const NO_SIGNAL_MESSAGE: &str = "📭 No tickers met the DCA condition today";

/// Render one signal as a chat message (Discord markdown).
pub fn format_signal(signal: &SignalResult) -> String {
    let date = DateTime::from_timestamp(signal.timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| signal.timestamp.to_string());

    let ema_status = if signal.ema_ordered {
        "EMA50>EMA100>Price>EMA200"
    } else {
        "EMA structure not aligned"
    };

    let levels = &signal.support_levels;

    format!(
        "📣 **{ticker}** meets the DCA condition [{tier}] ({date})\n\
         • StochRSI: %K={k:.2}, %D={d:.2}\n\
         • Price: ${close:.2}\n\
         • MACD: Day({day}), Week({week})\n\
         • EMA Structure: {ema_status}\n\
         • Support: 14d {s14}, 30d {s30}, 90d {s90}\n",
        ticker = signal.ticker,
        tier = signal.tier(),
        k = signal.percent_k,
        d = signal.percent_d,
        close = signal.close,
        day = signal.macd_day_trend,
        week = signal.macd_week_trend,
        s14 = price_or_na(levels.window14),
        s30 = price_or_na(levels.window30),
        s90 = price_or_na(levels.window90),
    )
}

fn price_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("${v:.2}"))
}
