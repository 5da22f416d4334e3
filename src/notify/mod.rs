// =============================================================================
// Notification Module
// =============================================================================
//
// Outbound delivery of formatted signal messages.  Failures are reported to
// the caller, which logs them and moves on; nothing here retries.

pub mod discord;
pub mod format;

use std::future::Future;

use tracing::info;

use crate::error::Result;

pub use discord::DiscordSink;
pub use format::{format_signal, NO_SIGNAL_MESSAGE};

/// Destination for human-readable messages.
pub trait NotificationSink {
    fn deliver(&self, message: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Writes messages to the log instead of sending them (dry run).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    async fn deliver(&self, message: &str) -> Result<()> {
        info!(content = message, "dry run, message not sent");
        Ok(())
    }
}

/// Either sink, chosen at startup from the run configuration.
pub enum Sink {
    Discord(DiscordSink),
    Log(LogSink),
}

impl NotificationSink for Sink {
    async fn deliver(&self, message: &str) -> Result<()> {
        match self {
            Self::Discord(sink) => sink.deliver(message).await,
            Self::Log(sink) => sink.deliver(message).await,
        }
    }
}
