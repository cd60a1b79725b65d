//! Availability sources for IELTS test slots.
//!
//! Each submodule watches one external scheduling provider and normalizes
//! whatever that provider exposes into a [`SourceReport`].
//!
//! # Supported sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | IELTS Tehran | [`ielts_tehran`] | Paginated JSON API | Concurrency-bounded, paced page fan-out |
//! | Irsafam | [`irsafam`] | HTML scraping | Single listing page, sentinel-phrase check |
//!
//! # Error policy
//!
//! Adapters absorb every failure, from transport errors and bad status
//! codes to malformed payloads, and return it as a report with
//! `has_error = true`. `fetch_all` never fails outward, so one broken
//! source can never take down a polling cycle.

use async_trait::async_trait;

use crate::models::SourceReport;

pub mod ielts_tehran;
pub mod irsafam;

/// A watched availability source.
///
/// Object-safe so the watcher can hold a heterogeneous collection; new
/// sources plug in without touching the orchestration code.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Display name of the source, used in logs and reports.
    fn site(&self) -> &'static str;

    /// Check the source once and report what was found.
    async fn fetch_all(&self) -> SourceReport;
}
