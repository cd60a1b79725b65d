//! Command-line interface definitions for the slot watcher.
//!
//! Every knob can be provided as a flag or through the environment, so the
//! binary runs unchanged under cron, a container scheduler, or by hand.

use clap::Parser;

/// Command-line arguments for the IELTS slot watcher.
///
/// # Examples
///
/// ```sh
/// # Poll every 5 minutes, deliver to Telegram
/// ielts_slot_watch --telegram-bot-token 123:ABC --telegram-chat-ids 111,222
///
/// # One cycle only (for an external scheduler), log-only delivery
/// ielts_slot_watch --once
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Exclusive upper bound of the page range swept on the paginated API
    #[arg(long, env = "PAGE_RANGE_END", default_value_t = 11)]
    pub page_range_end: u32,

    /// Delay between paced page requests, in seconds
    #[arg(long, env = "REQUEST_DELAY", default_value_t = 1.0)]
    pub request_delay: f64,

    /// Minutes between polling cycles
    #[arg(long, env = "CHECK_INTERVAL_MINUTES", default_value_t = 5)]
    pub interval_minutes: u64,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Telegram bot token; without it reports are only logged
    #[arg(long, env = "TELEGRAM_BOT_TOKEN")]
    pub telegram_bot_token: Option<String>,

    /// Comma-separated Telegram chat ids to deliver to
    #[arg(long, env = "TELEGRAM_CHAT_IDS")]
    pub telegram_chat_ids: Option<String>,

    /// Keep only this many run-history entries (unbounded when unset)
    #[arg(long, env = "HISTORY_CAP")]
    pub history_cap: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ielts_slot_watch"]);
        assert_eq!(cli.page_range_end, 11);
        assert_eq!(cli.request_delay, 1.0);
        assert_eq!(cli.interval_minutes, 5);
        assert!(!cli.once);
        assert!(cli.history_cap.is_none());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "ielts_slot_watch",
            "--page-range-end",
            "6",
            "--request-delay",
            "0.5",
            "--once",
            "--history-cap",
            "24",
        ]);
        assert_eq!(cli.page_range_end, 6);
        assert_eq!(cli.request_delay, 0.5);
        assert!(cli.once);
        assert_eq!(cli.history_cap, Some(24));
    }

    #[test]
    fn test_telegram_arguments() {
        let cli = Cli::parse_from([
            "ielts_slot_watch",
            "--telegram-bot-token",
            "123:ABC",
            "--telegram-chat-ids",
            "111, 222",
        ]);
        assert_eq!(cli.telegram_bot_token.as_deref(), Some("123:ABC"));
        assert_eq!(cli.telegram_chat_ids.as_deref(), Some("111, 222"));
    }
}
