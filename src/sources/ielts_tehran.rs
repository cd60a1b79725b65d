//! IELTS Tehran availability adapter.
//!
//! The IELTS Tehran back office exposes a paginated JSON events API. This
//! adapter walks a fixed page range through the shared [`FetchPool`],
//! validates every raw record, splits entries into fully-booked vs. open,
//! and collapses the whole sweep into one [`SourceReport`].
//!
//! A single bad page poisons the sweep: the first page-level error aborts
//! aggregation and everything gathered so far is discarded, so a report is
//! either complete or an error, never a partial view.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

use crate::models::{ExamEntry, ExamType, ScrapeResult, SourceReport, TestType};
use crate::pool::FetchPool;
use crate::sources::SourceAdapter;
use crate::utils::persian_date;

const SITE: &str = "IELTS Tehran";
const LISTING_URL: &str = "https://ieltstehran.com/computer-delivered-ielts-exam/";
const CONCURRENCY_LIMIT: usize = 5;

/// Capacity label the back office uses for a fully booked exam.
const FULLY_BOOKED_STATUS: &str = "تکمیل";
/// Status code equivalent of [`FULLY_BOOKED_STATUS`].
const FULLY_BOOKED_CODE: i64 = 0;

static EVENTS_ENDPOINT: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://backoffice.ieltstehran.com/api/public/events-list/exam")
        .expect("events endpoint URL is valid")
});

/// A raw record failed validation and cannot be normalized.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

/// JSON envelope returned per page. A missing `data` field is an empty
/// page, the same as an empty list.
#[derive(Debug, Deserialize)]
struct PageEnvelope {
    #[serde(default)]
    data: Vec<RawExam>,
}

/// One raw exam record as the API returns it. Fields are optional here so
/// validation stays an explicit step instead of a deserialization failure.
#[derive(Debug, Deserialize)]
struct RawExam {
    start_date: Option<String>,
    product_name: Option<String>,
    location_en_name: Option<String>,
    product_price_formated: Option<String>,
    capacity_status: Option<String>,
    capacity_status_code: Option<i64>,
    #[serde(default)]
    is_online: i64,
}

/// A validated record plus its capacity classification.
#[derive(Debug, PartialEq)]
struct NormalizedSlot {
    entry: ExamEntry,
    fully_booked: bool,
}

/// Watches the IELTS Tehran paginated events API.
pub struct IeltsTehran {
    client: reqwest::Client,
    endpoint: Url,
    page_range_end: u32,
    pool: FetchPool,
}

impl IeltsTehran {
    /// Pages `1..page_range_end` are fetched per sweep, at most
    /// [`CONCURRENCY_LIMIT`] in flight, paced by `request_delay`.
    pub fn new(client: reqwest::Client, page_range_end: u32, request_delay: Duration) -> Self {
        IeltsTehran {
            client,
            endpoint: EVENTS_ENDPOINT.clone(),
            page_range_end,
            pool: FetchPool::new(CONCURRENCY_LIMIT, request_delay),
        }
    }

    #[cfg(test)]
    fn with_endpoint(
        endpoint: Url,
        client: reqwest::Client,
        page_range_end: u32,
        request_delay: Duration,
    ) -> Self {
        IeltsTehran {
            client,
            endpoint,
            page_range_end,
            pool: FetchPool::new(CONCURRENCY_LIMIT, request_delay),
        }
    }

    /// Fetch and parse one page. Every failure mode (transport error, bad
    /// status, malformed body, invalid record) comes back as a
    /// `ScrapeResult` with `has_error` set; this never panics or
    /// propagates.
    #[instrument(level = "debug", skip(self))]
    async fn scrape_page(&self, page: u32) -> ScrapeResult {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("page", &page.to_string());

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                return ScrapeResult::failure(format!(
                    "error occurred while scraping page {page}: {e}"
                ))
            }
        };
        if !response.status().is_success() {
            return ScrapeResult::failure(format!(
                "failed to retrieve page {page}, status code {}",
                response.status()
            ));
        }
        match response.text().await {
            Ok(body) => parse_page(page, &body),
            Err(e) => ScrapeResult::failure(format!("error reading page {page}: {e}")),
        }
    }
}

#[async_trait]
impl SourceAdapter for IeltsTehran {
    fn site(&self) -> &'static str {
        SITE
    }

    async fn fetch_all(&self) -> SourceReport {
        let pages: Vec<u32> = (1..self.page_range_end).collect();
        info!(site = SITE, pages = pages.len(), "Checking paginated exam listing");

        let tasks: Vec<_> = pages.into_iter().map(|page| self.scrape_page(page)).collect();
        let results = self.pool.run_all(tasks).await;
        consolidate(results)
    }
}

/// Parse one page body into a [`ScrapeResult`].
///
/// An empty (or absent) `data` list is a no-data page, not an error. The
/// first invalid record fails the whole page.
fn parse_page(page: u32, body: &str) -> ScrapeResult {
    let envelope: PageEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => return ScrapeResult::failure(format!("malformed response on page {page}: {e}")),
    };

    if envelope.data.is_empty() {
        debug!(page, "No exams listed on page");
        return ScrapeResult::default();
    }

    let mut result = ScrapeResult::default();
    for raw in &envelope.data {
        match normalize(raw) {
            Ok(slot) => {
                if slot.fully_booked {
                    result.completed.push(slot.entry);
                } else {
                    result.incomplete.push(slot.entry);
                }
            }
            Err(e) => {
                return ScrapeResult::failure(format!("error parsing exam on page {page}: {e}"))
            }
        }
    }
    result
}

/// Merge per-page results (in page order) into the source report.
///
/// Aborts on the first page with `has_error`, discarding every entry
/// gathered so far.
fn consolidate(pages: Vec<ScrapeResult>) -> SourceReport {
    let mut completed: Vec<ExamEntry> = Vec::new();
    let mut incomplete: Vec<ExamEntry> = Vec::new();

    for page in pages {
        completed.extend(page.completed);
        incomplete.extend(page.incomplete);
        if page.has_error {
            return SourceReport::error(
                SITE,
                format!("{SITE} - error occurred while scraping page: {}", page.message),
            );
        }
    }

    info!(
        site = SITE,
        completed = completed.len(),
        incomplete = incomplete.len(),
        "Exam sweep complete"
    );

    if incomplete.is_empty() {
        return SourceReport::no_result(SITE);
    }

    let data = incomplete
        .iter()
        .map(describe_entry)
        .collect::<Vec<_>>()
        .join("\n");
    SourceReport::found(SITE, data, LISTING_URL)
}

fn describe_entry(entry: &ExamEntry) -> String {
    format!(
        "Name: {}\nStatus: {}\nExam Date: {}\n",
        entry.exam_name,
        entry.status,
        persian_date(&entry.exam_date)
    )
}

/// Validate a raw record and derive the normalized entry.
///
/// Required fields must be present and non-empty. Classification: the
/// fully-booked capacity label or status code `0` means no remaining
/// capacity; anything else is an open slot.
fn normalize(raw: &RawExam) -> Result<NormalizedSlot, RecordError> {
    let start_date = require(&raw.start_date, "start_date")?;
    let product_name = require(&raw.product_name, "product_name")?;
    let location = require(&raw.location_en_name, "location_en_name")?;
    let cost = require(&raw.product_price_formated, "product_price_formated")?;
    let status = require(&raw.capacity_status, "capacity_status")?;

    let fully_booked =
        status == FULLY_BOOKED_STATUS || raw.capacity_status_code == Some(FULLY_BOOKED_CODE);

    Ok(NormalizedSlot {
        entry: ExamEntry {
            status: status.to_string(),
            exam_name: product_name.to_string(),
            exam_type: ExamType::from_product_name(product_name),
            test_type: TestType::from_online_flag(raw.is_online),
            exam_date: start_date.to_string(),
            location: location.to_string(),
            cost: cost.to_string(),
        },
        fully_booked,
    })
}

fn require<'a>(field: &'a Option<String>, name: &'static str) -> Result<&'a str, RecordError> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(RecordError::MissingField(name)),
    }
}
