//! Filter predicate set for records views.
//!
//! A [`FilterState`] combines one free-text query with zero or more
//! categorical selections. A record is shown when it matches the query AND
//! every selection:
//!
//! - **Search**: empty query matches everything; otherwise any of the
//!   entity's search fields must contain the query, case-folded on both
//!   sides. Absent fields contribute no match.
//! - **Category**: [`Selection::All`] matches everything; otherwise the
//!   stored value must equal the selection exactly (case-sensitive). An
//!   absent value never equals a concrete selection.
//!
//! Filtering is a pure, stable projection: the result keeps the store's
//! relative order and is always a subset of it.
//!
//! # Example
//!
//! ```
//! use blotter_core::{apply, Case, CaseField, FilterState, Selection};
//!
//! let cases = vec![
//!     Case { id: "1".into(), status: Some("OPEN".into()), description: Some("bank theft".into()), ..Default::default() },
//!     Case { id: "2".into(), status: Some("CLOSED".into()), description: Some("car theft".into()), ..Default::default() },
//! ];
//!
//! let state = FilterState::new()
//!     .with_query("theft")
//!     .with_selection(CaseField::Status, Selection::value("CLOSED"));
//!
//! let shown = apply(&cases, &state);
//! assert_eq!(shown.len(), 1);
//! assert_eq!(shown[0].id, "2");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::trace;

use crate::defaults::SELECTION_ALL;
use crate::record::{CategoryField, Record};

// =============================================================================
// SELECTION
// =============================================================================

/// One categorical selection: the wildcard or an exact stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Value(String),
}

impl Selection {
    /// Exact-value selection.
    pub fn value(value: impl Into<String>) -> Self {
        Selection::Value(value.into())
    }

    /// Parse user input; the `"all"` sentinel becomes the wildcard.
    pub fn parse(input: &str) -> Self {
        if input == SELECTION_ALL {
            Selection::All
        } else {
            Selection::Value(input.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selection::All => SELECTION_ALL,
            Selection::Value(v) => v,
        }
    }
}

impl From<String> for Selection {
    fn from(s: String) -> Self {
        if s == SELECTION_ALL {
            Selection::All
        } else {
            Selection::Value(s)
        }
    }
}

impl From<Selection> for String {
    fn from(s: Selection) -> Self {
        match s {
            Selection::All => SELECTION_ALL.to_string(),
            Selection::Value(v) => v,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// FILTER STATE
// =============================================================================

/// The view-owned combination of free-text query and categorical selections.
///
/// Fields not present in `selections` read as [`Selection::All`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "F: Serialize",
    deserialize = "F: Deserialize<'de> + Ord"
))]
pub struct FilterState<F> {
    /// Free-text query (empty = no search constraint).
    #[serde(default)]
    pub query: String,

    /// Categorical selections keyed by field. `"all"` entries are dropped
    /// on the way in, same as [`FilterState::select`].
    #[serde(
        default = "BTreeMap::new",
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "deserialize_selections"
    )]
    selections: BTreeMap<F, Selection>,
}

fn deserialize_selections<'de, D, F>(deserializer: D) -> Result<BTreeMap<F, Selection>, D::Error>
where
    D: Deserializer<'de>,
    F: Deserialize<'de> + Ord,
{
    let mut selections = BTreeMap::<F, Selection>::deserialize(deserializer)?;
    selections.retain(|_, selection| !selection.is_all());
    Ok(selections)
}

impl<F: CategoryField> Default for FilterState<F> {
    fn default() -> Self {
        Self {
            query: String::new(),
            selections: BTreeMap::new(),
        }
    }
}

impl<F: CategoryField> FilterState<F> {
    /// Empty query, every field set to `"all"`.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    /// Set the free-text query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set one categorical selection.
    pub fn with_selection(mut self, field: F, selection: Selection) -> Self {
        self.select(field, selection);
        self
    }

    // =========================================================================
    // INPUT EVENTS
    // =========================================================================

    /// Replace the free-text query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Replace one categorical selection.
    pub fn select(&mut self, field: F, selection: Selection) {
        if selection.is_all() {
            self.selections.remove(&field);
        } else {
            self.selections.insert(field, selection);
        }
    }

    /// Back to the mount-time defaults.
    pub fn reset(&mut self) {
        self.query.clear();
        self.selections.clear();
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Current selection for `field`.
    pub fn selection(&self, field: F) -> &Selection {
        static ALL: Selection = Selection::All;
        self.selections.get(&field).unwrap_or(&ALL)
    }

    /// Non-wildcard selections, in field order.
    pub fn active_selections(&self) -> impl Iterator<Item = (F, &str)> {
        self.selections.iter().map(|(f, s)| (*f, s.as_str()))
    }

    /// Whether any predicate narrows the view.
    pub fn is_filtered(&self) -> bool {
        !self.query.is_empty() || !self.selections.is_empty()
    }

    /// Whether `record` passes every active predicate.
    pub fn matches<R: Record<Field = F>>(&self, record: &R) -> bool {
        matches_all(record, self)
    }
}

// =============================================================================
// PREDICATES
// =============================================================================

/// Case-folded query, computed once per filter pass.
struct FoldedQuery(Option<String>);

impl FoldedQuery {
    fn new(query: &str) -> Self {
        if query.is_empty() {
            FoldedQuery(None)
        } else {
            FoldedQuery(Some(query.to_lowercase()))
        }
    }

    fn matches<R: Record>(&self, record: &R) -> bool {
        let Some(needle) = self.0.as_deref() else {
            return true;
        };
        record
            .search_fields()
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Free-text predicate.
pub fn matches_search<R: Record>(record: &R, query: &str) -> bool {
    FoldedQuery::new(query).matches(record)
}

/// Categorical equality predicate.
pub fn matches_category<R: Record>(record: &R, field: R::Field, selection: &Selection) -> bool {
    match selection {
        Selection::All => true,
        Selection::Value(wanted) => record.category(field) == Some(wanted.as_str()),
    }
}

/// AND of the search predicate and every active categorical predicate.
pub fn matches_all<R: Record>(record: &R, state: &FilterState<R::Field>) -> bool {
    matches_folded(record, &FoldedQuery::new(&state.query), state)
}

fn matches_folded<R: Record>(
    record: &R,
    query: &FoldedQuery,
    state: &FilterState<R::Field>,
) -> bool {
    query.matches(record)
        && state
            .selections
            .iter()
            .all(|(field, selection)| matches_category(record, *field, selection))
}

/// Stable filter of `records` by `state`.
pub fn apply<'a, R: Record>(records: &'a [R], state: &FilterState<R::Field>) -> Vec<&'a R> {
    let query = FoldedQuery::new(&state.query);
    let shown: Vec<&R> = records
        .iter()
        .filter(|r| matches_folded(*r, &query, state))
        .collect();
    trace!(
        kind = %R::KIND,
        total = records.len(),
        shown_count = shown.len(),
        "Applied filter"
    );
    shown
}

/// Indices of the records passing `state`, in store order.
pub fn matching_indices<R: Record>(records: &[R], state: &FilterState<R::Field>) -> Vec<usize> {
    let query = FoldedQuery::new(&state.query);
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches_folded(*r, &query, state))
        .map(|(i, _)| i)
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
