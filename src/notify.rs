//! Report delivery to Telegram.
//!
//! The watcher core never talks to a transport; it hands [`SourceReport`]s
//! to a [`Notifier`]. The concrete channel here is the Telegram Bot API
//! `sendMessage` endpoint, fanned out to a configurable list of chats with
//! long messages split into chunks under Telegram's length limit.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::models::SourceReport;

/// Telegram rejects messages over 4096 characters; stay under it.
const MESSAGE_CHUNK_CHARS: usize = 4000;

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Telegram API error: {0}")]
    Api(String),
}

/// A delivery channel for report text.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message through this channel.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;

    /// Human-readable name for this channel.
    fn channel_name(&self) -> &str;
}

/// Whether a report warrants a user-facing message.
///
/// Quiet no-result runs are skipped; findings and failures are delivered.
pub fn should_deliver(report: &SourceReport) -> bool {
    report.found || report.has_error
}

/// Render a report as message text.
pub fn render_report(report: &SourceReport) -> String {
    if report.has_error {
        return format!("⚠️ {} check failed:\n{}", report.site, report.data);
    }
    let mut text = format!("🚨 Test slots found on {}:\n\n{}", report.site, report.data);
    if !report.link.is_empty() {
        text.push('\n');
        text.push_str(&report.link);
    }
    text
}

/// Split text into chunks of at most [`MESSAGE_CHUNK_CHARS`] characters.
///
/// Counts characters, not bytes: the reports carry Persian text and a
/// byte split could land inside a code point.
fn chunk_message(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(MESSAGE_CHUNK_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Sends reports via the Telegram Bot API.
pub struct TelegramNotifier {
    bot_token: String,
    chat_ids: Vec<String>,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Returns [`NotifyError::Config`] when the token or chat list is
    /// empty.
    pub fn new(
        bot_token: String,
        chat_ids: Vec<String>,
        client: reqwest::Client,
    ) -> Result<Self, NotifyError> {
        if bot_token.is_empty() {
            return Err(NotifyError::Config(
                "Telegram bot token must not be empty".to_string(),
            ));
        }
        if chat_ids.is_empty() {
            return Err(NotifyError::Config(
                "at least one Telegram chat id is required".to_string(),
            ));
        }
        Ok(TelegramNotifier {
            bot_token,
            chat_ids,
            client,
        })
    }

    async fn send_chunk(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        debug!(chat_id = %chat_id, chars = text.chars().count(), "Sending Telegram message");
        let response: serde_json::Value = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if response.get("ok") == Some(&serde_json::Value::Bool(true)) {
            return Ok(());
        }
        let description = response
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown Telegram API error");
        Err(NotifyError::Api(description.to_string()))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// Deliver `text` to every configured chat, chunked under the length
    /// limit. Fails on the first chat/chunk the API rejects.
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let chunks = chunk_message(text);
        for chat_id in &self.chat_ids {
            for chunk in &chunks {
                self.send_chunk(chat_id, chunk).await?;
            }
            info!(chat_id = %chat_id, chunks = chunks.len(), "Telegram message sent");
        }
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> reqwest::Client {
        reqwest::Client::new()
    }

    #[test]
    fn test_should_deliver_policy() {
        assert!(should_deliver(&SourceReport::found(
            "Irsafam",
            "Test found",
            "https://irsafam.org/ielts"
        )));
        assert!(should_deliver(&SourceReport::error("Irsafam", "boom")));
        assert!(!should_deliver(&SourceReport::no_result("Irsafam")));
    }

    #[test]
    fn test_render_found_report_includes_link() {
        let report = SourceReport::found("Irsafam", "Test found", "https://irsafam.org/ielts");
        let text = render_report(&report);
        assert!(text.contains("Irsafam"));
        assert!(text.contains("Test found"));
        assert!(text.ends_with("https://irsafam.org/ielts"));
    }

    #[test]
    fn test_render_error_report() {
        let report = SourceReport::error("IELTS Tehran", "status code 502");
        let text = render_report(&report);
        assert!(text.contains("check failed"));
        assert!(text.contains("status code 502"));
    }

    #[test]
    fn test_chunking_splits_long_messages() {
        let text = "a".repeat(MESSAGE_CHUNK_CHARS * 2 + 10);
        let chunks = chunk_message(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), MESSAGE_CHUNK_CHARS);
        assert_eq!(chunks[2].chars().count(), 10);
    }

    #[test]
    fn test_chunking_counts_chars_not_bytes() {
        // Multi-byte Persian text must split on character boundaries.
        let text = "تکمیل".repeat(MESSAGE_CHUNK_CHARS);
        let chunks = chunk_message(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= MESSAGE_CHUNK_CHARS));
        let rejoined: String = chunks.concat();
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_chunking_short_message() {
        assert_eq!(chunk_message("hello"), vec!["hello".to_string()]);
        assert!(chunk_message("").is_empty());
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = TelegramNotifier::new(String::new(), vec!["1".to_string()], client());
        assert!(matches!(result, Err(NotifyError::Config(_))));
    }

    #[test]
    fn test_empty_chat_list_rejected() {
        let result = TelegramNotifier::new("123:ABC".to_string(), vec![], client());
        assert!(matches!(result, Err(NotifyError::Config(_))));
    }

    #[test]
    fn test_channel_name() {
        let notifier =
            TelegramNotifier::new("123:ABC".to_string(), vec!["1".to_string()], client()).unwrap();
        assert_eq!(notifier.channel_name(), "telegram");
    }
}
