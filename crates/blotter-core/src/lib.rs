//! # blotter-core
//!
//! Core types for the blotter records client.
//!
//! This crate provides the pieces every records view shares:
//! - Typed entity records (criminals, cases, evidence, officers)
//! - The filter predicate set (free-text search + categorical selections)
//! - Summary projections (counts, category breakdowns, percentage rates)
//! - Registration-form validators
//!
//! Nothing in here performs I/O; the HTTP side lives in `blotter-client`.

pub mod activity;
pub mod defaults;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod logging;
pub mod models;
pub mod record;
pub mod stats;
pub mod summary;
pub mod validation;

// Re-export commonly used types at crate root
pub use activity::{ActivityKind, Priority, RecentActivity};
pub use error::{Error, Result};
pub use filter::{apply, matches_all, matches_category, matches_search, FilterState, Selection};
pub use models::*;
pub use record::{AnyRecord, CategoryField, EntityKind, Record};
pub use stats::{CaseStats, CriminalStats, OfficerStats, OverviewStats};
pub use summary::{count, count_by, count_values, rate, CategoryCounts, FilterSummary};
pub use validation::{FieldError, RegistrationForm, ValidationReport};
