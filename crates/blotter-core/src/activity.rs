//! Dashboard activity feed entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Criminal;
use crate::record::Record;

/// Newest criminal profiles listed in the feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 3;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    NewCriminal,
    CaseUpdate,
    Arrest,
}

/// Priority badge on a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// One entry in the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentActivity {
    pub id: String,
    pub kind: ActivityKind,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub priority: Priority,
}

impl RecentActivity {
    /// Age of the entry relative to `now`, e.g. `"5 minutes ago"`.
    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        relative_time(self.created_at, now)
    }
}

/// Coarse relative time: seconds collapse to "Just now", then minutes,
/// hours and days.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 60 {
        "Just now".to_string()
    } else if secs < 3_600 {
        format!("{} minutes ago", secs / 60)
    } else if secs < 86_400 {
        format!("{} hours ago", secs / 3_600)
    } else {
        format!("{} days ago", secs / 86_400)
    }
}

/// Most recently created criminals, newest first. Profiles without a
/// creation time are skipped.
pub fn recent_activity(criminals: &[Criminal]) -> Vec<RecentActivity> {
    let mut dated: Vec<(&Criminal, DateTime<Utc>)> = criminals
        .iter()
        .filter_map(|c| c.created_at.map(|at| (c, at)))
        .collect();
    dated.sort_by(|a, b| b.1.cmp(&a.1));
    dated
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|(c, at)| RecentActivity {
            id: c.id().to_string(),
            kind: ActivityKind::NewCriminal,
            name: c.display_name(),
            created_at: at,
            priority: if c.is_high_risk() {
                Priority::High
            } else {
                Priority::Medium
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_relative_time() {
        let now = at(0);
        assert_eq!(relative_time(now - Duration::seconds(59), now), "Just now");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2 days ago");
    }

    #[test]
    fn test_recent_activity_newest_first() {
        let criminal = |id: &str, secs: Option<i64>, threat: &str| Criminal {
            id: id.into(),
            first_name: Some("First".into()),
            last_name: Some(id.to_uppercase()),
            threat_level: Some(threat.into()),
            created_at: secs.map(at),
            ..Default::default()
        };
        let criminals = vec![
            criminal("a", Some(10), "LOW"),
            criminal("b", None, "HIGH"),
            criminal("c", Some(30), "EXTREME"),
            criminal("d", Some(20), "MEDIUM"),
            criminal("e", Some(5), "HIGH"),
        ];
        let activity = recent_activity(&criminals);
        let ids: Vec<&str> = activity.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d", "a"]);
        assert_eq!(activity[0].priority, Priority::High);
        assert_eq!(activity[0].kind, ActivityKind::NewCriminal);
        assert_eq!(activity[0].name, "First C");
        assert_eq!(activity[1].priority, Priority::Medium);
    }
}
