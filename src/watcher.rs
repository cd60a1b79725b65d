//! Cycle orchestration across all registered sources.

use futures::future::join_all;
use tracing::{info, instrument};

use crate::history::RunHistory;
use crate::models::SourceReport;
use crate::sources::SourceAdapter;

/// Drives one polling cycle over every registered [`SourceAdapter`] and
/// keeps the [`RunHistory`].
///
/// Sources run concurrently and are fully isolated from each other: every
/// adapter absorbs its own failures into its report, so one broken or
/// wedged source never suppresses another source's findings.
pub struct Watcher {
    adapters: Vec<Box<dyn SourceAdapter>>,
    history: RunHistory,
}

impl Watcher {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>, history: RunHistory) -> Self {
        Watcher { adapters, history }
    }

    /// Run every source once and return all per-source reports, in
    /// registration order.
    ///
    /// After all sources resolve, one history entry is recorded: whether
    /// any source found open slots this cycle.
    #[instrument(level = "info", skip_all)]
    pub async fn run_cycle(&mut self) -> Vec<SourceReport> {
        let reports = join_all(self.adapters.iter().map(|adapter| adapter.fetch_all())).await;

        let found_open = reports.iter().any(|report| report.found);
        self.history.record(found_open);

        info!(
            sources = reports.len(),
            found_open,
            errors = reports.iter().filter(|r| r.has_error).count(),
            cycles = self.history.len(),
            "Polling cycle complete"
        );
        reports
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }
}
