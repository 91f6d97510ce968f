//! Record store: one entity collection held in memory.
//!
//! The store is populated wholesale from a single collection fetch and
//! replaced (never merged) on every successful reload. Fetch failures stop
//! here: they become an [`ApiStatus::Error`] plus a message, and the
//! records are either cleared or swapped for a fixed fallback set according
//! to the store's [`FailurePolicy`].
//!
//! Concurrent loads are ordered by a request-sequence guard. Every
//! [`RecordStore::load`] takes a ticket from a monotonic counter and its
//! response is applied only while that ticket is still the latest one
//! issued, so a slow older response can never overwrite newer data.
//! A ticket settles when its load returns or its future is dropped; the
//! store reads as loading while the latest ticket is unsettled.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, instrument, warn};

use blotter_core::defaults::EVENT_BUS_CAPACITY;
use blotter_core::{EntityKind, Record};

use crate::source::RecordSource;

// =============================================================================
// STATUS
// =============================================================================

/// Connection status shown next to a records view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    /// Initial state, or a request is in flight.
    #[default]
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiStatus::Connecting => write!(f, "connecting"),
            ApiStatus::Connected => write!(f, "connected"),
            ApiStatus::Error => write!(f, "error"),
        }
    }
}

/// What a store shows after a failed fetch.
#[derive(Debug, Clone)]
pub enum FailurePolicy<R> {
    /// Empty the store.
    Clear,
    /// Replace the store with a fixed substitute sequence.
    Fallback(Arc<[R]>),
}

impl<R> Default for FailurePolicy<R> {
    fn default() -> Self {
        FailurePolicy::Clear
    }
}

impl<R> FailurePolicy<R> {
    /// Fallback policy from owned records.
    pub fn fallback(records: Vec<R>) -> Self {
        FailurePolicy::Fallback(records.into())
    }

    fn records(&self) -> Option<Arc<[R]>> {
        match self {
            FailurePolicy::Clear => None,
            FailurePolicy::Fallback(records) => Some(records.clone()),
        }
    }
}

/// Result of one [`RecordStore::load`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The fetched records replaced the store. `count` may be zero.
    Applied { count: usize },
    /// The fetch failed; the failure policy was applied.
    Failed { error: String, fallback_used: bool },
    /// A newer load was issued before this one resolved; its response was
    /// discarded.
    Superseded,
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied { .. })
    }
}

/// Store lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Loading {
        kind: EntityKind,
        ticket: u64,
    },
    Loaded {
        kind: EntityKind,
        ticket: u64,
        count: usize,
    },
    Failed {
        kind: EntityKind,
        ticket: u64,
        message: String,
        fallback_used: bool,
    },
    Superseded {
        kind: EntityKind,
        ticket: u64,
    },
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Point-in-time view of a store.
#[derive(Debug, Clone)]
pub struct StoreSnapshot<R> {
    /// Records in server order.
    pub records: Arc<[R]>,
    pub status: ApiStatus,
    /// Error message while `status` is [`ApiStatus::Error`].
    pub message: Option<String>,
    /// A request is in flight.
    pub loading: bool,
    /// When records were last replaced by a successful fetch.
    pub last_updated: Option<DateTime<Utc>>,
}

impl<R> StoreSnapshot<R> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct StoreState<R> {
    records: Arc<[R]>,
    status: ApiStatus,
    message: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    applied_ticket: u64,
}

/// Settles a load ticket on drop, including when the load future is
/// cancelled mid-flight.
struct TicketGuard<'a, R> {
    state: &'a RwLock<StoreState<R>>,
    issued: &'a AtomicU64,
    settled: &'a AtomicU64,
    ticket: u64,
    previous_status: ApiStatus,
    finished: bool,
}

impl<R> Drop for TicketGuard<'_, R> {
    fn drop(&mut self) {
        self.settled.fetch_max(self.ticket, Ordering::SeqCst);
        if self.finished || self.ticket != self.issued.load(Ordering::SeqCst) {
            return;
        }
        debug!(ticket = self.ticket, "Load cancelled before completion");
        if let Ok(mut state) = self.state.try_write() {
            if state.status == ApiStatus::Connecting {
                state.status = self.previous_status;
            }
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// In-memory collection of one entity type.
pub struct RecordStore<R: Record> {
    source: Arc<dyn RecordSource<R>>,
    policy: FailurePolicy<R>,
    state: RwLock<StoreState<R>>,
    issued: AtomicU64,
    settled: AtomicU64,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl<R: Record> RecordStore<R> {
    /// Empty store that clears itself on failure.
    pub fn new(source: Arc<dyn RecordSource<R>>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self {
            source,
            policy: FailurePolicy::Clear,
            state: RwLock::new(StoreState {
                records: Arc::from(Vec::new()),
                status: ApiStatus::Connecting,
                message: None,
                last_updated: None,
                applied_ticket: 0,
            }),
            issued: AtomicU64::new(0),
            settled: AtomicU64::new(0),
            event_tx,
        }
    }

    /// Choose what the store shows after a failed fetch.
    pub fn with_failure_policy(mut self, policy: FailurePolicy<R>) -> Self {
        self.policy = policy;
        self
    }

    pub fn failure_policy(&self) -> &FailurePolicy<R> {
        &self.policy
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    /// Fetch the collection and replace the store.
    ///
    /// Never returns an error: failures are recorded in the store status
    /// and reported through the returned [`LoadOutcome`].
    #[instrument(
        skip(self),
        fields(subsystem = "store", component = "record_store", op = "load", collection = %R::KIND)
    )]
    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let mut guard = TicketGuard {
            state: &self.state,
            issued: &self.issued,
            settled: &self.settled,
            ticket,
            previous_status: ApiStatus::Connecting,
            finished: false,
        };
        {
            let mut state = self.state.write().await;
            guard.previous_status = state.status;
            state.status = ApiStatus::Connecting;
        }
        let _ = self.event_tx.send(StoreEvent::Loading {
            kind: R::KIND,
            ticket,
        });
        debug!(ticket, source = %self.source.describe(), "Load started");

        let start = Instant::now();
        let result = self.source.fetch_all().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let mut state = self.state.write().await;
        guard.finished = true;
        if ticket != self.issued.load(Ordering::SeqCst) || ticket <= state.applied_ticket {
            debug!(ticket, duration_ms, "Discarding superseded response");
            drop(state);
            let _ = self.event_tx.send(StoreEvent::Superseded {
                kind: R::KIND,
                ticket,
            });
            return LoadOutcome::Superseded;
        }
        state.applied_ticket = ticket;

        match result {
            Ok(records) => {
                let count = records.len();
                state.records = records.into();
                state.status = ApiStatus::Connected;
                state.message = None;
                state.last_updated = Some(Utc::now());
                drop(state);

                info!(ticket, result_count = count, duration_ms, "Loaded {}", R::KIND.noun());
                let _ = self.event_tx.send(StoreEvent::Loaded {
                    kind: R::KIND,
                    ticket,
                    count,
                });
                LoadOutcome::Applied { count }
            }
            Err(e) => {
                let message = format!("Failed to load {}: {}", R::KIND.noun(), e);
                let fallback = self.policy.records();
                let fallback_used = fallback.is_some();
                state.records = fallback.unwrap_or_else(|| Arc::from(Vec::new()));
                state.status = ApiStatus::Error;
                state.message = Some(message.clone());
                drop(state);

                warn!(
                    ticket,
                    duration_ms,
                    http_status = e.status(),
                    fallback = fallback_used,
                    error = %e,
                    "Load failed"
                );
                let _ = self.event_tx.send(StoreEvent::Failed {
                    kind: R::KIND,
                    ticket,
                    message: message.clone(),
                    fallback_used,
                });
                LoadOutcome::Failed {
                    error: message,
                    fallback_used,
                }
            }
        }
    }

    /// Reload the collection. Same semantics as [`RecordStore::load`].
    pub async fn refresh(&self) -> LoadOutcome {
        self.load().await
    }

    /// Current records, status and message.
    pub async fn snapshot(&self) -> StoreSnapshot<R> {
        let state = self.state.read().await;
        StoreSnapshot {
            records: state.records.clone(),
            status: state.status,
            message: state.message.clone(),
            loading: self.in_flight(),
            last_updated: state.last_updated,
        }
    }

    /// Current records.
    pub async fn records(&self) -> Arc<[R]> {
        self.state.read().await.records.clone()
    }

    pub async fn status(&self) -> ApiStatus {
        self.state.read().await.status
    }

    pub async fn is_loading(&self) -> bool {
        self.in_flight()
    }

    fn in_flight(&self) -> bool {
        self.settled.load(Ordering::SeqCst) < self.issued.load(Ordering::SeqCst)
    }

    /// Number of load tickets issued so far.
    pub fn issued_tickets(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}
