//! Structured logging schema and field name constants for blotter.
//!
//! Both crates use these names for structured `tracing` fields so log
//! output can be queried by the same keys regardless of which view
//! produced it.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | View cannot show anything useful, requires operator attention |
//! | WARN  | Fetch failed, empty state or fallback data applied |
//! | INFO  | Lifecycle events (mount, refresh start/stop), load completions |
//! | DEBUG | Decision points (superseded responses, policy choices) |
//! | TRACE | Per-record data (filter decisions) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID for one collection fetch.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "client", "store", "refresh", "view", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "http_source", "record_store", "auto_refresh"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "load", "fetch_all", "overview"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Collection being fetched (endpoint path without slashes).
pub const COLLECTION: &str = "collection";

/// Monotonic request ticket used by the sequence guard.
pub const TICKET: &str = "ticket";

/// Free-text search query.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned by a fetch.
pub const RESULT_COUNT: &str = "result_count";

/// Number of records surviving the filter predicate set.
pub const SHOWN_COUNT: &str = "shown_count";

/// HTTP status code returned by the backend.
pub const HTTP_STATUS: &str = "http_status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Whether fallback data was installed after a failure.
pub const FALLBACK: &str = "fallback";

/// Every field name above, for tooling that validates log output.
pub const ALL_FIELDS: &[&str] = &[
    REQUEST_ID,
    SUBSYSTEM,
    COMPONENT,
    OPERATION,
    COLLECTION,
    TICKET,
    QUERY,
    DURATION_MS,
    RESULT_COUNT,
    SHOWN_COUNT,
    HTTP_STATUS,
    SUCCESS,
    ERROR_MSG,
    FALLBACK,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_are_unique() {
        let unique: HashSet<&str> = ALL_FIELDS.iter().copied().collect();
        assert_eq!(unique.len(), ALL_FIELDS.len());
    }

    #[test]
    fn test_field_names_are_snake_case() {
        for name in ALL_FIELDS {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "{} is not snake_case",
                name
            );
        }
    }
}
