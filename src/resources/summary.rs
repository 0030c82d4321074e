//! Client-side list aggregates
//!
//! Computed from the fetched rows on every refresh, never persisted and
//! never asked of the backend.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;

use crate::records::{self, Record};

use super::SummarySpec;

/// Render one summary as a `label: value` fragment for the header line.
pub fn compute(spec: &SummarySpec, rows: &[Record]) -> String {
    match spec {
        SummarySpec::TotalRangeDays {
            rows: rows_key,
            from,
            to,
            label,
        } => format!("{}: {}", label, total_range_days(rows, rows_key, from, to)),
        SummarySpec::UniqueRefs { field, label } => {
            format!("{}: {}", label, unique_refs(rows, field))
        }
        SummarySpec::KeywordCount {
            field,
            keyword,
            label,
        } => format!("{}: {}", label, keyword_count(rows, field, keyword)),
    }
}

/// Day span of every date range summed across all rows, inclusive of both
/// endpoints. Unparseable ranges contribute nothing.
fn total_range_days(rows: &[Record], rows_key: &str, from: &str, to: &str) -> i64 {
    rows.iter()
        .filter_map(|record| record.get(rows_key).and_then(Value::as_array))
        .flatten()
        .filter_map(|range| {
            let from = parse_date(range.get(from)?)?;
            let to = parse_date(range.get(to)?)?;
            let span = (to - from).num_days() + 1;
            (span > 0).then_some(span)
        })
        .sum()
}

fn unique_refs(rows: &[Record], field: &str) -> usize {
    rows.iter()
        .filter_map(|record| record.get(field).and_then(records::ref_id))
        .collect::<HashSet<_>>()
        .len()
}

fn keyword_count(rows: &[Record], field: &str, keyword: &str) -> usize {
    rows.iter()
        .filter(|record| records::cell_text(record, field).contains(keyword))
        .count()
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = records::date_input(value);
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_total_days_counts_both_endpoints() {
        let rows = vec![
            record(json!({"dates": [{"fromDate": "2025-01-01", "toDate": "2025-01-01"}]})),
            record(json!({"dates": [{"fromDate": "2025-01-05", "toDate": "2025-01-07"}]})),
        ];
        assert_eq!(total_range_days(&rows, "dates", "fromDate", "toDate"), 4);
    }

    #[test]
    fn test_total_days_sums_multiple_ranges_per_row() {
        let rows = vec![record(json!({"dates": [
            {"fromDate": "2025-03-01T00:00:00.000Z", "toDate": "2025-03-02T00:00:00.000Z"},
            {"fromDate": "2025-04-10", "toDate": "2025-04-10"},
        ]}))];
        assert_eq!(total_range_days(&rows, "dates", "fromDate", "toDate"), 3);
    }

    #[test]
    fn test_total_days_skips_unparseable_and_inverted_ranges() {
        let rows = vec![record(json!({"dates": [
            {"fromDate": "soon", "toDate": "2025-01-07"},
            {"fromDate": "2025-01-07", "toDate": "2025-01-05"},
            {"fromDate": "2025-01-01", "toDate": "2025-01-02"},
        ]}))];
        assert_eq!(total_range_days(&rows, "dates", "fromDate", "toDate"), 2);
    }

    #[test]
    fn test_unique_refs_over_embedded_and_bare_ids() {
        let rows = vec![
            record(json!({"session": {"_id": "s1", "name": "2024-2025"}})),
            record(json!({"session": {"_id": "s2", "name": "2025-2026"}})),
            record(json!({"session": "s1"})),
            record(json!({"name": "no session"})),
        ];
        assert_eq!(unique_refs(&rows, "session"), 2);
    }

    #[test]
    fn test_keyword_count_matches_substrings() {
        let rows = vec![
            record(json!({"name": "সরকারি ছুটি"})),
            record(json!({"name": "ধর্মীয় ছুটি"})),
            record(json!({"name": "সরকারি সাধারণ ছুটি"})),
        ];
        assert_eq!(keyword_count(&rows, "name", "সরকারি"), 2);
        assert_eq!(keyword_count(&rows, "name", "ছুটি"), 3);
        assert_eq!(keyword_count(&rows, "name", "গ্রীষ্ম"), 0);
    }

    #[test]
    fn test_compute_formats_label_and_value() {
        let rows = vec![
            record(json!({"dates": [{"fromDate": "2025-01-01", "toDate": "2025-01-01"}]})),
        ];
        let spec = SummarySpec::TotalRangeDays {
            rows: "dates",
            from: "fromDate",
            to: "toDate",
            label: "Total days",
        };
        assert_eq!(compute(&spec, &rows), "Total days: 1");
    }
}
