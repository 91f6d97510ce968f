//! Centralized default constants for blotter.
//!
//! **This module is the single source of truth** for shared default values.
//! Client configuration, the store and the terminal viewer reference these
//! constants instead of defining their own magic numbers.

// =============================================================================
// BACKEND
// =============================================================================

/// Default REST backend base URL.
pub const API_URL: &str = "http://localhost:8000/api";

/// Per-request timeout for collection fetches (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Timeout for the lightweight health check (seconds).
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// REFRESH
// =============================================================================

/// Interval between timed refreshes of a records view (seconds).
pub const REFRESH_INTERVAL_SECS: u64 = 30;

/// Capacity of the per-store event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 64;

// =============================================================================
// FILTERING
// =============================================================================

/// Wildcard sentinel for a categorical selection.
pub const SELECTION_ALL: &str = "all";

/// Criminal name shown when an evidence item references an unknown criminal.
pub const UNKNOWN_CRIMINAL: &str = "Unknown Criminal";

// =============================================================================
// VALIDATION
// =============================================================================

/// Minimum password length for officer registration.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Characters accepted as "special" by the password strength rules.
pub const PASSWORD_SPECIAL_CHARS: &str = "@$!%*?&";
