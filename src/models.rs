//! Data models shared by the source adapters and the watcher.
//!
//! This module defines the core data structures used throughout the
//! application:
//! - [`ExamEntry`]: one normalized exam slot as offered by a source
//! - [`ScrapeResult`]: the unit returned by a single page fetch
//! - [`SourceReport`]: the outward-facing report produced per source
//!
//! [`SourceReport`] values are built through the associated constructors so
//! that an error report can never claim `found = true` and never carries a
//! deep link.

use serde::Serialize;

/// Academic vs. General Training, derived from the product name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExamType {
    Academic,
    General,
}

impl ExamType {
    /// Derive the exam type from the source's product name.
    ///
    /// Product names for Academic modules carry the literal word
    /// `"Academic"`; everything else is General Training.
    pub fn from_product_name(name: &str) -> Self {
        if name.contains("Academic") {
            ExamType::Academic
        } else {
            ExamType::General
        }
    }
}

/// Online vs. in-centre computer-delivered, derived from the source's
/// online flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestType {
    Online,
    Computer,
}

impl TestType {
    /// Derive the test type from the source's `is_online` flag (`1` means
    /// online).
    pub fn from_online_flag(flag: i64) -> Self {
        if flag == 1 {
            TestType::Online
        } else {
            TestType::Computer
        }
    }
}

/// One offered exam slot, normalized from a source's raw record.
///
/// `exam_type` and `test_type` are always derived
/// ([`ExamType::from_product_name`], [`TestType::from_online_flag`]);
/// adapters never set them from anything but the raw source fields.
/// `exam_date` keeps the source-native format; presentation formatting
/// happens at message-rendering time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamEntry {
    /// Free-text availability label as reported by the source.
    pub status: String,
    /// Display name of the exam product.
    pub exam_name: String,
    pub exam_type: ExamType,
    pub test_type: TestType,
    /// Date string in the source's native format.
    pub exam_date: String,
    pub location: String,
    /// Formatted currency string as reported by the source.
    pub cost: String,
}

/// The outcome of fetching and parsing one page of a source.
///
/// Constructed fresh per page, immutable once returned. Pages with no
/// listed exams are an empty success, not an error.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScrapeResult {
    /// Entries with no remaining capacity.
    pub completed: Vec<ExamEntry>,
    /// Entries with remaining capacity.
    pub incomplete: Vec<ExamEntry>,
    pub has_error: bool,
    /// Diagnostic text; empty on success.
    pub message: String,
}

impl ScrapeResult {
    /// A failed page fetch. Any previously parsed entries are dropped.
    pub fn failure(message: impl Into<String>) -> Self {
        ScrapeResult {
            has_error: true,
            message: message.into(),
            ..ScrapeResult::default()
        }
    }
}

/// The standard report shape returned by every source adapter and consumed
/// by the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    /// Whether anything actionable was discovered.
    pub found: bool,
    /// Display name of the source.
    pub site: String,
    pub has_error: bool,
    /// Human-readable findings or error detail.
    pub data: String,
    /// Deep link to the source listing; empty when there is nowhere to go.
    pub link: String,
}

impl SourceReport {
    /// Actionable findings with a destination link.
    pub fn found(site: &str, data: impl Into<String>, link: impl Into<String>) -> Self {
        SourceReport {
            found: true,
            site: site.to_string(),
            has_error: false,
            data: data.into(),
            link: link.into(),
        }
    }

    /// A clean run that discovered nothing.
    pub fn no_result(site: &str) -> Self {
        SourceReport {
            found: false,
            site: site.to_string(),
            has_error: false,
            data: "No test found".to_string(),
            link: String::new(),
        }
    }

    /// A failed run. Forces `found = false` and an empty link.
    pub fn error(site: &str, detail: impl Into<String>) -> Self {
        SourceReport {
            found: false,
            site: site.to_string(),
            has_error: true,
            data: detail.into(),
            link: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_type_academic() {
        assert_eq!(
            ExamType::from_product_name("IELTS Academic - Tehran"),
            ExamType::Academic
        );
    }

    #[test]
    fn test_exam_type_general() {
        assert_eq!(
            ExamType::from_product_name("IELTS General Training"),
            ExamType::General
        );
        assert_eq!(ExamType::from_product_name(""), ExamType::General);
    }

    #[test]
    fn test_test_type_from_flag() {
        assert_eq!(TestType::from_online_flag(1), TestType::Online);
        assert_eq!(TestType::from_online_flag(0), TestType::Computer);
        assert_eq!(TestType::from_online_flag(2), TestType::Computer);
    }

    #[test]
    fn test_scrape_result_failure_drops_entries() {
        let failed = ScrapeResult::failure("boom");
        assert!(failed.has_error);
        assert_eq!(failed.message, "boom");
        assert!(failed.completed.is_empty());
        assert!(failed.incomplete.is_empty());
    }

    #[test]
    fn test_error_report_is_never_found() {
        let report = SourceReport::error("Irsafam", "timed out");
        assert!(report.has_error);
        assert!(!report.found);
        assert_eq!(report.link, "");
        assert_eq!(report.data, "timed out");
    }

    #[test]
    fn test_found_report_carries_link() {
        let report = SourceReport::found("IELTS Tehran", "Test found", "https://example.com");
        assert!(report.found);
        assert!(!report.has_error);
        assert_eq!(report.link, "https://example.com");
    }

    #[test]
    fn test_no_result_report() {
        let report = SourceReport::no_result("IELTS Tehran");
        assert!(!report.found);
        assert!(!report.has_error);
        assert_eq!(report.data, "No test found");
        assert_eq!(report.link, "");
    }

    #[test]
    fn test_source_report_serializes() {
        let report = SourceReport::no_result("IELTS Tehran");
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"site\":\"IELTS Tehran\""));
        assert!(json.contains("\"found\":false"));
    }
}
