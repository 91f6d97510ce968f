//! # blotter-client
//!
//! Async client side of the blotter records views.
//!
//! - [`HttpClient`] / [`HttpSource`]: collection fetches against the REST backend
//! - [`RecordStore`]: in-memory collection with status, failure policy and
//!   a request-sequence guard for overlapping loads
//! - [`spawn_auto_refresh`]: timed reloads with explicit shutdown
//! - [`RecordView`]: store plus the user's filter state
//! - [`OverviewLoader`]: dashboard headline numbers

pub mod config;
pub mod overview;
pub mod refresh;
pub mod source;
pub mod store;
pub mod view;

pub use config::ClientConfig;
pub use overview::{Overview, OverviewLoader};
pub use refresh::{spawn_auto_refresh, RefreshHandle};
pub use source::{EnrichedEvidenceSource, HttpClient, HttpSource, RecordSource};
pub use store::{ApiStatus, FailurePolicy, LoadOutcome, RecordStore, StoreEvent, StoreSnapshot};
pub use view::{FilteredView, RecordView, ViewState};
