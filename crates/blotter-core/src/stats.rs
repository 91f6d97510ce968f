//! Per-entity statistics shown above each records table and on the
//! dashboard overview.

use serde::{Deserialize, Serialize};

use crate::models::{Case, CaseField, Criminal, CriminalField, Evidence, EvidenceField, Officer};
use crate::summary::{count_by, count_by_month, rate, CategoryCounts};

/// Criminal headline counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CriminalStats {
    pub total: usize,
    pub incarcerated: usize,
    pub at_large: usize,
    pub extreme_threat: usize,
    pub high_threat: usize,
    pub violent_offenders: usize,
    pub escape_risks: usize,
}

impl CriminalStats {
    pub fn from_records(criminals: &[Criminal]) -> Self {
        let total = criminals.len();
        let incarcerated = criminals
            .iter()
            .filter(|c| c.is_incarcerated == Some(true))
            .count();
        let threat = |level: &str| {
            criminals
                .iter()
                .filter(|c| c.threat_level.as_deref() == Some(level))
                .count()
        };
        Self {
            total,
            incarcerated,
            at_large: total - incarcerated,
            extreme_threat: threat("EXTREME"),
            high_threat: threat("HIGH"),
            violent_offenders: criminals
                .iter()
                .filter(|c| c.violent_offender == Some(true))
                .count(),
            escape_risks: criminals
                .iter()
                .filter(|c| c.escape_risk == Some(true))
                .count(),
        }
    }

    /// Share of criminals in custody, as a whole percentage.
    pub fn incarceration_rate(&self) -> u32 {
        rate(self.incarcerated, self.total)
    }

    /// Breakdown by threat level, first-seen order.
    pub fn by_threat_level(criminals: &[Criminal]) -> CategoryCounts {
        count_by(criminals, CriminalField::ThreatLevel)
    }
}

/// Case headline counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaseStats {
    pub total: usize,
    pub open: usize,
    /// Closed or convicted.
    pub cleared: usize,
}

impl CaseStats {
    pub fn from_records(cases: &[Case]) -> Self {
        Self {
            total: cases.len(),
            open: cases.iter().filter(|c| c.is_open()).count(),
            cleared: cases.iter().filter(|c| c.is_cleared()).count(),
        }
    }

    /// Cleared cases over all cases, as a whole percentage.
    pub fn clearance_rate(&self) -> u32 {
        rate(self.cleared, self.total)
    }

    pub fn by_crime_type(cases: &[Case]) -> CategoryCounts {
        count_by(cases, CaseField::CrimeType)
    }

    pub fn by_status(cases: &[Case]) -> CategoryCounts {
        count_by(cases, CaseField::Status)
    }

    pub fn by_month(cases: &[Case]) -> CategoryCounts {
        count_by_month(cases)
    }
}

/// Officer headline counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OfficerStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl OfficerStats {
    pub fn from_records(officers: &[Officer]) -> Self {
        let total = officers.len();
        let active = officers
            .iter()
            .filter(|o| o.is_active == Some(true))
            .count();
        Self {
            total,
            active,
            inactive: total - active,
        }
    }
}

/// Breakdown of evidence items by type, first-seen order.
pub fn evidence_by_type(evidence: &[Evidence]) -> CategoryCounts {
    count_by(evidence, EvidenceField::EvidenceType)
}

/// Dashboard overview numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewStats {
    pub total_criminals: usize,
    pub active_cases: usize,
    pub officers: usize,
    pub clearance_rate: u32,
    pub incarcerated: usize,
    pub at_large: usize,
}

impl OverviewStats {
    pub fn compute(criminals: &[Criminal], cases: &[Case], officers: &[Officer]) -> Self {
        let criminal_stats = CriminalStats::from_records(criminals);
        let case_stats = CaseStats::from_records(cases);
        Self {
            total_criminals: criminal_stats.total,
            active_cases: case_stats.open,
            officers: officers.len(),
            clearance_rate: case_stats.clearance_rate(),
            incarcerated: criminal_stats.incarcerated,
            at_large: criminal_stats.at_large,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criminal(id: &str, threat: &str, jailed: Option<bool>) -> Criminal {
        Criminal {
            id: id.into(),
            threat_level: Some(threat.into()),
            is_incarcerated: jailed,
            ..Default::default()
        }
    }

    fn case(id: &str, status: &str) -> Case {
        Case {
            id: id.into(),
            status: Some(status.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_criminal_stats() {
        let mut violent = criminal("4", "EXTREME", Some(true));
        violent.violent_offender = Some(true);
        violent.escape_risk = Some(true);
        let criminals = vec![
            criminal("1", "HIGH", Some(true)),
            criminal("2", "LOW", Some(false)),
            criminal("3", "HIGH", None),
            violent,
        ];
        let stats = CriminalStats::from_records(&criminals);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.incarcerated, 2);
        // Unknown incarceration counts as at large.
        assert_eq!(stats.at_large, 2);
        assert_eq!(stats.high_threat, 2);
        assert_eq!(stats.extreme_threat, 1);
        assert_eq!(stats.violent_offenders, 1);
        assert_eq!(stats.escape_risks, 1);
        assert_eq!(stats.incarceration_rate(), 50);
    }

    #[test]
    fn test_case_stats_clearance() {
        let cases = vec![
            case("1", "OPEN"),
            case("2", "CLOSED"),
            case("3", "CONVICTED"),
        ];
        let stats = CaseStats::from_records(&cases);
        assert_eq!(stats.open, 1);
        assert_eq!(stats.cleared, 2);
        assert_eq!(stats.clearance_rate(), 67);
        assert_eq!(CaseStats::from_records(&[]).clearance_rate(), 0);
    }

    #[test]
    fn test_officer_stats() {
        let officers = vec![
            Officer {
                id: "1".into(),
                is_active: Some(true),
                ..Default::default()
            },
            Officer {
                id: "2".into(),
                is_active: Some(false),
                ..Default::default()
            },
            Officer {
                id: "3".into(),
                ..Default::default()
            },
        ];
        let stats = OfficerStats::from_records(&officers);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.inactive, 2);
    }

    #[test]
    fn test_overview_compute() {
        let criminals = vec![
            criminal("1", "HIGH", Some(true)),
            criminal("2", "LOW", Some(false)),
        ];
        let cases = vec![case("1", "OPEN"), case("2", "CLOSED")];
        let officers = vec![Officer {
            id: "9".into(),
            ..Default::default()
        }];
        let overview = OverviewStats::compute(&criminals, &cases, &officers);
        assert_eq!(
            overview,
            OverviewStats {
                total_criminals: 2,
                active_cases: 1,
                officers: 1,
                clearance_rate: 50,
                incarcerated: 1,
                at_large: 1,
            }
        );
    }
}
