//! The `Record` abstraction shared by every entity collection.
//!
//! Each entity type declares, at compile time:
//! - the fixed subset of string fields free-text search looks at, and
//! - an enum of its categorical fields, so filter selections cannot name a
//!   field the entity does not have.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Case, Criminal, Evidence, Officer};

// =============================================================================
// ENTITY KIND
// =============================================================================

/// Discriminant for the four record collections served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Criminal,
    Case,
    Evidence,
    Officer,
}

impl EntityKind {
    /// Every entity kind, in navigation order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Criminal,
        EntityKind::Case,
        EntityKind::Evidence,
        EntityKind::Officer,
    ];

    /// Collection endpoint path relative to the API base URL.
    pub fn collection_path(&self) -> &'static str {
        match self {
            EntityKind::Criminal => "criminals/",
            EntityKind::Case => "crimes/",
            EntityKind::Evidence => "criminal-evidence/",
            EntityKind::Officer => "officers/",
        }
    }

    /// Plural noun used in status messages and summaries.
    pub fn noun(&self) -> &'static str {
        match self {
            EntityKind::Criminal => "criminals",
            EntityKind::Case => "crimes",
            EntityKind::Evidence => "evidence items",
            EntityKind::Officer => "officers",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Criminal => write!(f, "criminal"),
            EntityKind::Case => write!(f, "case"),
            EntityKind::Evidence => write!(f, "evidence"),
            EntityKind::Officer => write!(f, "officer"),
        }
    }
}

// =============================================================================
// CATEGORY FIELDS
// =============================================================================

/// A categorical field of one entity type.
///
/// Implemented by small fieldless enums. `known_values` lists the enumerated
/// values the backend is documented to produce, as `(value, label)` pairs;
/// matching itself never consults this table, it only feeds display labels
/// and input hints.
pub trait CategoryField: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Every field of this entity, in display order.
    fn all() -> &'static [Self];

    /// Wire/command-line name of the field.
    fn name(&self) -> &'static str;

    /// Documented values for this field.
    fn known_values(&self) -> &'static [(&'static str, &'static str)];

    /// Look up a field by its name.
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.name() == name)
    }

    /// Display label for a stored value, falling back to the value itself.
    fn label_for<'a>(&self, value: &'a str) -> &'a str {
        self.known_values()
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, label)| *label)
            .unwrap_or(value)
    }

    /// Whether `value` is one of the documented values.
    fn is_known_value(&self, value: &str) -> bool {
        self.known_values().iter().any(|(v, _)| *v == value)
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// One immutable entity snapshot as returned by a collection endpoint.
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    /// Categorical fields this entity can be filtered on.
    type Field: CategoryField;

    /// Which collection this record belongs to.
    const KIND: EntityKind;

    /// Unique identifier.
    fn id(&self) -> &str;

    /// The fixed subset of string fields consulted by free-text search.
    /// Absent fields are `None` and never match.
    fn search_fields(&self) -> Vec<Option<&str>>;

    /// Stored value of a categorical field, `None` when absent.
    fn category(&self, field: Self::Field) -> Option<&str>;
}

// =============================================================================
// ANY RECORD
// =============================================================================

/// Discriminated union over every entity record type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum AnyRecord {
    Criminal(Criminal),
    Case(Case),
    Evidence(Evidence),
    Officer(Officer),
}

impl AnyRecord {
    /// Entity kind of the wrapped record.
    pub fn kind(&self) -> EntityKind {
        match self {
            AnyRecord::Criminal(_) => EntityKind::Criminal,
            AnyRecord::Case(_) => EntityKind::Case,
            AnyRecord::Evidence(_) => EntityKind::Evidence,
            AnyRecord::Officer(_) => EntityKind::Officer,
        }
    }

    /// Identifier of the wrapped record.
    pub fn id(&self) -> &str {
        match self {
            AnyRecord::Criminal(r) => r.id(),
            AnyRecord::Case(r) => r.id(),
            AnyRecord::Evidence(r) => r.id(),
            AnyRecord::Officer(r) => r.id(),
        }
    }

    /// Free-text search against the wrapped record's own search fields.
    pub fn matches_search(&self, query: &str) -> bool {
        match self {
            AnyRecord::Criminal(r) => crate::filter::matches_search(r, query),
            AnyRecord::Case(r) => crate::filter::matches_search(r, query),
            AnyRecord::Evidence(r) => crate::filter::matches_search(r, query),
            AnyRecord::Officer(r) => crate::filter::matches_search(r, query),
        }
    }
}

impl From<Criminal> for AnyRecord {
    fn from(r: Criminal) -> Self {
        AnyRecord::Criminal(r)
    }
}

impl From<Case> for AnyRecord {
    fn from(r: Case) -> Self {
        AnyRecord::Case(r)
    }
}

impl From<Evidence> for AnyRecord {
    fn from(r: Evidence) -> Self {
        AnyRecord::Evidence(r)
    }
}

impl From<Officer> for AnyRecord {
    fn from(r: Officer) -> Self {
        AnyRecord::Officer(r)
    }
}
