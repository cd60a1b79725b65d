//! # IELTS Slot Watch
//!
//! Polls IELTS exam-scheduling sources for newly opened test slots and
//! reports findings to Telegram.
//!
//! ## Sources
//!
//! - IELTS Tehran's paginated back-office events API
//! - Irsafam's HTML listing page
//!
//! ## Architecture
//!
//! Each source is a [`SourceAdapter`] producing one [`SourceReport`] per
//! cycle. Multi-page sources fan their requests out through a bounded,
//! paced fetch pool. The [`Watcher`] runs all sources concurrently and
//! independently, records the cycle outcome in the run history, and hands
//! every actionable report to the notifier. Cycles are driven by an
//! internal interval timer, or one at a time with `--once` when an
//! external scheduler does the triggering.

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod history;
mod models;
mod notify;
mod pool;
mod sources;
mod utils;
mod watcher;

use cli::Cli;
use history::RunHistory;
use models::SourceReport;
use notify::{Notifier, TelegramNotifier};
use sources::ielts_tehran::IeltsTehran;
use sources::irsafam::Irsafam;
use sources::SourceAdapter;
use watcher::Watcher;

/// Hard timeout for every outbound request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("slot watcher starting up");
    let args = Cli::parse();

    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let request_delay = Duration::from_secs_f64(args.request_delay.max(0.0));

    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(IeltsTehran::new(
            client.clone(),
            args.page_range_end,
            request_delay,
        )),
        Box::new(Irsafam::new(client.clone())),
    ];
    let sites: Vec<&str> = adapters.iter().map(|adapter| adapter.site()).collect();
    info!(
        sources = ?sites,
        page_range_end = args.page_range_end,
        "Sources registered"
    );

    let history = match args.history_cap {
        Some(cap) => RunHistory::with_cap(cap),
        None => RunHistory::new(),
    };
    let mut watcher = Watcher::new(adapters, history);
    let notifier = build_notifier(&args, client)?;

    if args.once {
        let reports = watcher.run_cycle().await;
        deliver(&reports, notifier.as_deref()).await;
        return Ok(());
    }

    let interval_minutes = args.interval_minutes.max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_minutes * 60));
    info!(interval_minutes, "Entering polling loop");
    loop {
        ticker.tick().await;
        let reports = watcher.run_cycle().await;
        deliver(&reports, notifier.as_deref()).await;
    }
}

/// Build the Telegram notifier from configuration, or `None` when Telegram
/// is not configured (reports are then only logged).
fn build_notifier(
    args: &Cli,
    client: reqwest::Client,
) -> Result<Option<Box<dyn Notifier>>, Box<dyn Error>> {
    let (Some(token), Some(ids)) = (&args.telegram_bot_token, &args.telegram_chat_ids) else {
        warn!("Telegram is not configured; reports will only be logged");
        return Ok(None);
    };
    let chat_ids: Vec<String> = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect();
    let notifier = TelegramNotifier::new(token.clone(), chat_ids, client)?;
    Ok(Some(Box::new(notifier)))
}

/// Send every actionable report through the channel; quiet no-result runs
/// are skipped. Delivery failures are logged, never fatal.
async fn deliver(reports: &[SourceReport], notifier: Option<&dyn Notifier>) {
    for report in reports.iter().filter(|report| notify::should_deliver(report)) {
        let text = notify::render_report(report);
        match notifier {
            Some(channel) => match channel.send(&text).await {
                Ok(()) => {
                    info!(site = %report.site, channel = channel.channel_name(), "Report delivered")
                }
                Err(e) => error!(site = %report.site, error = %e, "Failed to deliver report"),
            },
            None => info!(site = %report.site, report = %text, "Report (delivery unconfigured)"),
        }
    }
}
