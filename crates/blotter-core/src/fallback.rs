//! Fixed substitute data shown by views that keep themselves populated
//! when the live fetch fails.
//!
//! Only the cases view and the dashboard overview use fallback data; the
//! criminals, evidence and officers views show an empty state instead.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::activity::{ActivityKind, Priority, RecentActivity};
use crate::models::Case;
use crate::stats::OverviewStats;

/// Substitute cases for the cases view.
pub fn cases() -> Vec<Case> {
    let case = |id: &str,
                crime_type: &str,
                description: &str,
                date: Option<NaiveDate>,
                location: &str,
                status: &str,
                criminal_name: &str,
                officer_name: &str| Case {
        id: id.to_string(),
        crime_type: Some(crime_type.to_string()),
        description: Some(description.to_string()),
        date_committed: date,
        location: Some(location.to_string()),
        status: Some(status.to_string()),
        criminal: Some(id.to_string()),
        criminal_name: Some(criminal_name.to_string()),
        arresting_officer: None,
        arresting_officer_name: Some(officer_name.to_string()),
    };

    vec![
        case(
            "1",
            "ROBBERY",
            "Armed robbery at Central Bank downtown",
            NaiveDate::from_ymd_opt(2024, 1, 15),
            "Central Bank, Downtown",
            "OPEN",
            "John Doe",
            "Det. Johnson",
        ),
        case(
            "2",
            "THEFT",
            "High-value jewelry store robbery",
            NaiveDate::from_ymd_opt(2024, 1, 10),
            "Jewelry Store, Main Street",
            "CLOSED",
            "Sarah Miller",
            "Det. Martinez",
        ),
        case(
            "3",
            "FRAUD",
            "Large-scale online banking fraud scheme",
            NaiveDate::from_ymd_opt(2024, 1, 18),
            "Online",
            "OPEN",
            "Robert Johnson",
            "Det. Chen",
        ),
    ]
}

/// Substitute dashboard numbers.
pub fn overview() -> OverviewStats {
    OverviewStats {
        total_criminals: 1247,
        active_cases: 356,
        officers: 48,
        clearance_rate: 78,
        incarcerated: 893,
        at_large: 354,
    }
}

/// Substitute activity feed, dated relative to `now`.
pub fn recent_activity(now: DateTime<Utc>) -> Vec<RecentActivity> {
    let entry = |id: &str, kind, name: &str, ago: Duration, priority| RecentActivity {
        id: id.to_string(),
        kind,
        name: name.to_string(),
        created_at: now - ago,
        priority,
    };

    vec![
        entry(
            "1",
            ActivityKind::NewCriminal,
            "Marcus Johnson",
            Duration::minutes(2),
            Priority::High,
        ),
        entry(
            "2",
            ActivityKind::CaseUpdate,
            "Case #CR-2024-0012",
            Duration::minutes(15),
            Priority::Medium,
        ),
        entry(
            "3",
            ActivityKind::Arrest,
            "Sarah Miller apprehended",
            Duration::hours(1),
            Priority::High,
        ),
    ]
}
