//! Timeline ordering: dates on the dashboard are free text, so entries are
//! ordered by whatever date each one can be parsed into.

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, NaiveDate};

use crate::models::TimelineEntry;

/// Date formats seen in timeline entries: ISO dates from the form and
/// `Mar 12, 2025` from seeded records.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"];

const MONTH_LABELS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse a timeline date. Returns `None` for anything unrecognised.
pub fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive())
}

fn newest_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort, newest first. Entries with unparseable dates go last in
/// their original relative order.
pub fn sort_newest_first(entries: &mut [TimelineEntry]) {
    entries.sort_by(|a, b| newest_first(parse_entry_date(&a.date), parse_entry_date(&b.date)));
}

/// Lower-case short month name used as the x-axis label of metric points.
pub fn month_label(date: NaiveDate) -> &'static str {
    MONTH_LABELS[date.month0() as usize]
}
