//! Outbound status notifications.
//!
//! One-way, fire-and-forget: delivery failures are logged here and
//! never propagated into the session flow. The sink is a trait so
//! tests can assert on emitted events instead of console text.

use async_trait::async_trait;
use tracing::{debug, warn};

use pttauto_core::constants::{NOTIFY_TIMEOUT, TELEGRAM_API_BASE};
use pttauto_core::error::{Error, Result};

/// One-way status push.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a status message. Must not raise into the caller.
    async fn notify(&self, text: &str) -> bool;
}

/// Sink used when notification credentials are absent.
#[derive(Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, text: &str) -> bool {
        debug!(text, "notification dropped, no credentials configured");
        true
    }
}

/// Delivers status messages through the Telegram Bot API.
pub struct TelegramNotifier {
    token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Build a notifier for the given bot token and chat id.
    pub fn new(token: &str, chat_id: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .map_err(|e| Error::Transport {
                message: format!("failed to build http client: {e}"),
            })?;
        Ok(Self {
            token: token.to_string(),
            chat_id: chat_id.to_string(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> bool {
        // The URL embeds the bot token; keep it out of the logs.
        let url = format!("{TELEGRAM_API_BASE}/bot{}/sendMessage", self.token);
        let result = self
            .client
            .post(&url)
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(text, "notification delivered");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "telegram rejected notification");
                false
            }
            Err(e) => {
                warn!(error = %e, "notification send failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_notifier_reports_success() {
        assert!(NoopNotifier.notify("anything").await);
    }

    #[test]
    fn telegram_notifier_builds() {
        let notifier = TelegramNotifier::new("123456:ABC-DEF", "987654321").unwrap();
        assert_eq!(notifier.chat_id, "987654321");
    }
}
