// src/crawl/summary.rs
// =============================================================================
// What happened during a run, beyond the records themselves.
//
// Most failures in a crawl are local (one page, one row, one detail) and
// are skipped. The summary counts them so a run that "found nothing" can be
// told apart from a run that couldn't read anything.
// =============================================================================

use crate::models::DetailedRecord;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    /// Listing pages we intended to read
    pub pages_planned: u32,
    /// Listing pages that failed or held no usable rows
    pub pages_empty: u32,
    pub rows_malformed: usize,
    /// Rows dropped by the listing filter
    pub rows_excluded: usize,
    /// Detail pages that could not be fetched
    pub details_failed: usize,
    /// Records dropped by the post-detail re-check
    pub details_rejected: usize,
    pub records: usize,
    pub records_with_email: usize,
    /// The run was stopped before it finished
    pub stopped_early: bool,
}

impl CrawlSummary {
    pub fn count_records(&mut self, records: &[DetailedRecord]) {
        self.records = records.len();
        self.records_with_email = records
            .iter()
            .filter(|r| r.contact_email.is_some())
            .count();
    }
}

/// Records plus the summary of the run that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub records: Vec<DetailedRecord>,
    pub summary: CrawlSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BasicRecord;

    #[test]
    fn test_count_records() {
        let mut with_email = DetailedRecord::from_basic(BasicRecord::new("https://x/1"));
        with_email.contact_email = Some("office@scoil.ie".to_string());
        let without = DetailedRecord::from_basic(BasicRecord::new("https://x/2"));

        let mut summary = CrawlSummary::default();
        summary.count_records(&[with_email, without]);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.records_with_email, 1);
    }
}
