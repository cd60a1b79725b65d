//! Irsafam availability adapter.
//!
//! Irsafam has no public API; its listing page is fetched and checked for
//! the "no exam found" notice the site renders beside an alert icon. If the
//! notice is absent the page is showing actual exam listings, which is all
//! this adapter needs to know; the report just points at the listing URL.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

use crate::models::SourceReport;
use crate::sources::SourceAdapter;

const SITE: &str = "Irsafam";
const SEARCH_URL: &str = "https://irsafam.org/ielts?";
const LISTING_URL: &str = "https://irsafam.org/ielts";

/// Notice text shown when the search matched no exams.
const NO_EXAM_SENTINEL: &str = "بر اساس جستجوی شما هیچ آزمونی پیدا نشد.";

/// The notice lives in a `<span>` directly after the alert icon.
static ALERT_TEXT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"img[src="/asset/images/alert.svg"] + span"#)
        .expect("alert marker selector is valid")
});

/// Watches the Irsafam exam listing page.
pub struct Irsafam {
    client: reqwest::Client,
    url: String,
}

impl Irsafam {
    pub fn new(client: reqwest::Client) -> Self {
        Irsafam {
            client,
            url: SEARCH_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_url(url: &str, client: reqwest::Client) -> Self {
        Irsafam {
            client,
            url: url.to_string(),
        }
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_document(&self) -> Result<String, reqwest::Error> {
        self.client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl SourceAdapter for Irsafam {
    fn site(&self) -> &'static str {
        SITE
    }

    async fn fetch_all(&self) -> SourceReport {
        match self.fetch_document().await {
            Ok(html) => classify_listing(&html),
            Err(e) => {
                warn!(site = SITE, error = %e, "Listing fetch failed");
                SourceReport::error(SITE, format!("error loading the page: {e}"))
            }
        }
    }
}

/// Decide what a successfully fetched listing page says.
///
/// The sentinel check is substring containment on the text beside the alert
/// icon. A page without that structure at all (empty marker text) is a page
/// showing listings, so it counts as found.
fn classify_listing(html: &str) -> SourceReport {
    let marker = alert_text(html);
    debug!(site = SITE, marker = %marker, "Alert marker text");

    if marker.contains(NO_EXAM_SENTINEL) {
        SourceReport::no_result(SITE)
    } else {
        SourceReport::found(SITE, "Test found", LISTING_URL)
    }
}

/// Concatenated text of every span sitting next to the alert icon.
fn alert_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&ALERT_TEXT)
        .flat_map(|element| element.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const NO_RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="alert">
            <img src="/asset/images/alert.svg" alt="">
            <span>بر اساس جستجوی شما هیچ آزمونی پیدا نشد.</span>
          </div>
        </body></html>"#;

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="exam-card"><h3>IELTS Academic</h3><span>Tehran</span></div>
          <div class="exam-card"><h3>IELTS General</h3><span>Karaj</span></div>
        </body></html>"#;

    #[test]
    fn test_sentinel_beside_icon_means_no_result() {
        let report = classify_listing(NO_RESULTS_PAGE);
        assert!(!report.found);
        assert!(!report.has_error);
        assert_eq!(report.data, "No test found");
        assert_eq!(report.link, "");
    }

    #[test]
    fn test_listing_page_means_found() {
        let report = classify_listing(RESULTS_PAGE);
        assert!(report.found);
        assert!(!report.has_error);
        assert_eq!(report.data, "Test found");
        assert_eq!(report.link, LISTING_URL);
    }

    #[test]
    fn test_sentinel_without_icon_structure_is_ignored() {
        // The notice text only counts when it sits beside the alert icon.
        let html = r#"<html><body>
            <p>بر اساس جستجوی شما هیچ آزمونی پیدا نشد.</p>
        </body></html>"#;
        let report = classify_listing(html);
        assert!(report.found);
    }

    #[test]
    fn test_empty_document_is_found() {
        let report = classify_listing("<html><body></body></html>");
        assert!(report.found);
    }

    #[test]
    fn test_alert_text_concatenates_matches() {
        let text = alert_text(NO_RESULTS_PAGE);
        assert!(text.contains(NO_EXAM_SENTINEL));
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_error_report() {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let adapter = Irsafam::with_url("http://does-not-exist.invalid/", client);
        let report = adapter.fetch_all().await;
        assert!(report.has_error);
        assert!(!report.found);
        assert_eq!(report.link, "");
    }
}
