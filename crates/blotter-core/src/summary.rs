//! Summary projections over a (filtered) record sequence.
//!
//! These are recomputed on every render from the filtered view; nothing here
//! is cached.

use std::fmt;

use chrono::Datelike;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::models::Case;
use crate::record::Record;

/// Number of records in a sequence.
pub fn count<T>(records: &[T]) -> usize {
    records.len()
}

/// Whole-number percentage `numerator / denominator`, rounded half up.
///
/// Returns 0 when `denominator` is 0.
///
/// ```
/// use blotter_core::rate;
///
/// assert_eq!(rate(78, 100), 78);
/// assert_eq!(rate(1, 3), 33);
/// assert_eq!(rate(2, 3), 67);
/// assert_eq!(rate(0, 0), 0);
/// ```
pub fn rate(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let n = numerator as u128;
    let d = denominator as u128;
    // floor(100n/d + 1/2)
    let pct = (200 * n + d) / (2 * d);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

// =============================================================================
// CATEGORY COUNTS
// =============================================================================

/// Distinct value → occurrence count, keys in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    entries: Vec<(String, usize)>,
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`.
    pub fn add(&mut self, key: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, n)) => *n += 1,
            None => self.entries.push((key.to_string(), 1)),
        }
    }

    /// Occurrences of `key` (0 if never seen).
    pub fn get(&self, key: &str) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// `(key, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), *n))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, n) in &self.entries {
            map.serialize_entry(k, n)?;
        }
        map.end()
    }
}

/// Count arbitrary optional values; `None` is skipped.
pub fn count_values<'a, I>(values: I) -> CategoryCounts
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts = CategoryCounts::new();
    for value in values.into_iter().flatten() {
        counts.add(value);
    }
    counts
}

/// Breakdown of `records` by one categorical field.
///
/// Records without a value for `field` are not counted under any key.
pub fn count_by<'a, R, I>(records: I, field: R::Field) -> CategoryCounts
where
    R: Record,
    I: IntoIterator<Item = &'a R>,
{
    count_values(records.into_iter().map(|r| r.category(field)))
}

/// Cases per month committed, keyed `"YYYY-MM"` in first-seen order.
/// Cases without a date are skipped.
pub fn count_by_month<'a, I>(cases: I) -> CategoryCounts
where
    I: IntoIterator<Item = &'a Case>,
{
    let mut counts = CategoryCounts::new();
    for date in cases.into_iter().filter_map(|c| c.date_committed) {
        counts.add(&format!("{:04}-{:02}", date.year(), date.month()));
    }
    counts
}

// =============================================================================
// FILTER SUMMARY
// =============================================================================

/// "Showing N of M" line for a records view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    /// Records in the store.
    pub total: usize,
    /// Records surviving the filter.
    pub shown: usize,
    /// Whether any predicate was active.
    pub filtered: bool,
}

impl FilterSummary {
    pub fn new(total: usize, shown: usize, filtered: bool) -> Self {
        Self {
            total,
            shown,
            filtered,
        }
    }

    /// Human-readable line, e.g. `"Showing 2 of 3 crimes (filtered)"`.
    pub fn describe(&self, noun: &str) -> String {
        let mut line = format!("Showing {} of {} {}", self.shown, self.total, noun);
        if self.filtered {
            line.push_str(" (filtered)");
        }
        line
    }

    /// Nothing to show, either because the store is empty or the filter
    /// excluded everything.
    pub fn is_empty(&self) -> bool {
        self.shown == 0
    }
}

impl fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe("records"))
    }
}
