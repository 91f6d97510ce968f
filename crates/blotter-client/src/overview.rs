//! Dashboard overview: headline numbers across criminals, cases and officers.
//!
//! The criminals collection is required. Cases and officers are optional:
//! when either fetch fails the overview is still computed, treating the
//! missing collection as empty. When the criminals fetch fails the whole
//! overview switches to the fixed fallback numbers and activity feed.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use blotter_core::activity::recent_activity;
use blotter_core::{
    fallback, Case, Criminal, Officer, OverviewStats, Record, RecentActivity, Result,
};

use crate::source::{HttpClient, HttpSource, RecordSource};
use crate::store::ApiStatus;

/// Result of loading the dashboard overview.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub stats: OverviewStats,
    pub recent_activity: Vec<RecentActivity>,
    pub status: ApiStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The fixed fallback numbers are shown instead of live data.
    pub fallback_used: bool,
    pub last_updated: DateTime<Utc>,
}

/// Loads the three collections the overview is computed from.
pub struct OverviewLoader {
    criminals: Arc<dyn RecordSource<Criminal>>,
    cases: Arc<dyn RecordSource<Case>>,
    officers: Arc<dyn RecordSource<Officer>>,
}

impl OverviewLoader {
    pub fn new(
        criminals: Arc<dyn RecordSource<Criminal>>,
        cases: Arc<dyn RecordSource<Case>>,
        officers: Arc<dyn RecordSource<Officer>>,
    ) -> Self {
        Self {
            criminals,
            cases,
            officers,
        }
    }

    pub fn from_client(client: HttpClient) -> Self {
        Self::new(
            Arc::new(HttpSource::<Criminal>::new(client.clone())),
            Arc::new(HttpSource::<Case>::new(client.clone())),
            Arc::new(HttpSource::<Officer>::new(client)),
        )
    }

    /// Fetch everything and compute the overview. Never fails.
    #[instrument(skip(self), fields(subsystem = "client", component = "overview", op = "overview"))]
    pub async fn load(&self) -> Overview {
        let start = Instant::now();
        let (criminals, cases, officers) = tokio::join!(
            self.criminals.fetch_all(),
            self.cases.fetch_all(),
            self.officers.fetch_all()
        );

        let criminals = match criminals {
            Ok(criminals) => criminals,
            Err(e) => {
                warn!(error = %e, fallback = true, "Criminals unavailable, showing fallback overview");
                let now = Utc::now();
                return Overview {
                    stats: fallback::overview(),
                    recent_activity: fallback::recent_activity(now),
                    status: ApiStatus::Error,
                    message: Some(format!("Failed to load overview: {}", e)),
                    fallback_used: true,
                    last_updated: now,
                };
            }
        };
        let cases = optional("crimes", cases);
        let officers = optional("officers", officers);

        let stats = OverviewStats::compute(&criminals, &cases, &officers);
        info!(
            total_criminals = stats.total_criminals,
            active_cases = stats.active_cases,
            officers = stats.officers,
            duration_ms = start.elapsed().as_millis() as u64,
            "Overview loaded"
        );

        Overview {
            stats,
            recent_activity: recent_activity(&criminals),
            status: ApiStatus::Connected,
            message: None,
            fallback_used: false,
            last_updated: Utc::now(),
        }
    }
}

fn optional<R: Record>(noun: &str, result: Result<Vec<R>>) -> Vec<R> {
    result.unwrap_or_else(|e| {
        warn!(collection = noun, error = %e, "Optional collection unavailable, counting as empty");
        Vec::new()
    })
}
