// =============================================================================
// Discord webhook sink
// =============================================================================
//
// POST {"content": "..."} to an incoming-webhook URL.  The URL embeds the
// webhook token, so it is never logged.
// =============================================================================

use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, instrument};

use super::NotificationSink;
use crate::error::{Result, ScanError};

/// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

#[derive(Clone)]
pub struct DiscordSink {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordSink {
    pub fn new(webhook_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build webhook HTTP client")?;

        Ok(Self {
            webhook_url: webhook_url.into(),
            client,
        })
    }
}

impl std::fmt::Debug for DiscordSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordSink").finish_non_exhaustive()
    }
}

impl NotificationSink for DiscordSink {
    #[instrument(skip_all, name = "discord::deliver")]
    async fn deliver(&self, message: &str) -> Result<()> {
        let content = truncate_chars(message, MAX_CONTENT_CHARS);

        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookPayload { content })
            .send()
            .await
            .map_err(|e| ScanError::Delivery(format!("webhook request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScanError::Delivery(format!(
                "webhook returned {status}: {body}"
            )));
        }

        debug!(%status, chars = content.chars().count(), "message delivered");
        Ok(())
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
