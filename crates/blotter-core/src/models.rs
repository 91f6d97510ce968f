//! Entity record types as served by the records backend.
//!
//! Every field except the identifier is optional: the backend omits or nulls
//! fields freely, and a field carrying an unexpected JSON type deserializes
//! to `None` instead of rejecting the whole collection. Identifiers arrive as
//! UUID strings (criminals, cases, evidence) or integers (officers) and are
//! normalised to `String`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::defaults::UNKNOWN_CRIMINAL;
use crate::record::{CategoryField, EntityKind, Record};

// =============================================================================
// WIRE HELPERS
// =============================================================================

/// Deserialize any JSON value, keeping it only if it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

fn id_from_value(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Required identifier: string or integer.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    id_from_value(&value)
        .ok_or_else(|| de::Error::custom(format!("expected string or integer id, got {}", value)))
}

/// Nullable foreign key: string or integer, anything else is `None`.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(id_from_value(&value))
}

// =============================================================================
// CRIMINAL
// =============================================================================

/// Documented threat levels.
pub const THREAT_LEVELS: &[(&str, &str)] = &[
    ("LOW", "Low Threat"),
    ("MEDIUM", "Medium Threat"),
    ("HIGH", "High Threat"),
    ("EXTREME", "Extreme Threat"),
];

/// Derived custody values (from `is_incarcerated`).
pub const CUSTODY_VALUES: &[(&str, &str)] =
    &[("incarcerated", "In Custody"), ("at_large", "At Large")];

/// Documented gender codes.
pub const GENDERS: &[(&str, &str)] = &[
    ("M", "Male"),
    ("F", "Female"),
    ("O", "Other"),
    ("U", "Unknown"),
];

/// Criminal profile (list projection of the backend's criminal resource).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criminal {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub threat_level: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub is_incarcerated: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub violent_offender: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub escape_risk: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub current_facility: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub crimes_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Criminal {
    /// "First Last", preferring the server-computed full name.
    pub fn display_name(&self) -> String {
        if let Some(full) = self.full_name.as_deref().filter(|s| !s.is_empty()) {
            return full.to_string();
        }
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Uppercase initials for avatars.
    pub fn initials(&self) -> String {
        let first = self.first_name.as_deref().and_then(|s| s.chars().next());
        let last = self.last_name.as_deref().and_then(|s| s.chars().next());
        first
            .into_iter()
            .chain(last)
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// HIGH or EXTREME threat.
    pub fn is_high_risk(&self) -> bool {
        matches!(self.threat_level.as_deref(), Some("HIGH") | Some("EXTREME"))
    }

    /// Derived custody category. Unknown incarceration reads as at large.
    pub fn custody(&self) -> Option<&'static str> {
        if self.is_incarcerated == Some(true) {
            Some("incarcerated")
        } else {
            Some("at_large")
        }
    }

    /// "In Custody" or "At Large". Unknown incarceration reads as at large.
    pub fn incarceration_status(&self) -> &'static str {
        if self.is_incarcerated == Some(true) {
            "In Custody"
        } else {
            "At Large"
        }
    }
}

/// Categorical fields of a criminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriminalField {
    ThreatLevel,
    Custody,
    Gender,
}

impl CategoryField for CriminalField {
    fn all() -> &'static [Self] {
        &[
            CriminalField::ThreatLevel,
            CriminalField::Custody,
            CriminalField::Gender,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            CriminalField::ThreatLevel => "threat_level",
            CriminalField::Custody => "custody",
            CriminalField::Gender => "gender",
        }
    }

    fn known_values(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            CriminalField::ThreatLevel => THREAT_LEVELS,
            CriminalField::Custody => CUSTODY_VALUES,
            CriminalField::Gender => GENDERS,
        }
    }
}

impl Record for Criminal {
    type Field = CriminalField;
    const KIND: EntityKind = EntityKind::Criminal;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.alias.as_deref(),
        ]
    }

    fn category(&self, field: CriminalField) -> Option<&str> {
        match field {
            CriminalField::ThreatLevel => self.threat_level.as_deref(),
            CriminalField::Custody => self.custody(),
            CriminalField::Gender => self.gender.as_deref(),
        }
    }
}

// =============================================================================
// CASE
// =============================================================================

/// Documented case statuses.
pub const CASE_STATUSES: &[(&str, &str)] = &[
    ("OPEN", "Open Investigation"),
    ("CLOSED", "Case Closed"),
    ("CONVICTED", "Convicted"),
];

/// Documented crime types.
pub const CRIME_TYPES: &[(&str, &str)] = &[
    ("THEFT", "Theft"),
    ("ASSAULT", "Assault"),
    ("BURGLARY", "Burglary"),
    ("ROBBERY", "Robbery"),
    ("DRUGS", "Drug Offense"),
    ("FRAUD", "Fraud"),
    ("HOMICIDE", "Homicide"),
    ("OTHER", "Other"),
];

/// A crime case (the backend's `crimes` resource).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub crime_type: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub date_committed: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Criminal id.
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub criminal: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub criminal_name: Option<String>,
    /// Officer id.
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub arresting_officer: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub arresting_officer_name: Option<String>,
}

impl Case {
    /// Still under investigation.
    pub fn is_open(&self) -> bool {
        self.status.as_deref() == Some("OPEN")
    }

    /// Closed or convicted; counts toward the clearance rate.
    pub fn is_cleared(&self) -> bool {
        matches!(self.status.as_deref(), Some("CLOSED") | Some("CONVICTED"))
    }
}

/// Categorical fields of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseField {
    Status,
    CrimeType,
}

impl CategoryField for CaseField {
    fn all() -> &'static [Self] {
        &[CaseField::Status, CaseField::CrimeType]
    }

    fn name(&self) -> &'static str {
        match self {
            CaseField::Status => "status",
            CaseField::CrimeType => "crime_type",
        }
    }

    fn known_values(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            CaseField::Status => CASE_STATUSES,
            CaseField::CrimeType => CRIME_TYPES,
        }
    }
}

impl Record for Case {
    type Field = CaseField;
    const KIND: EntityKind = EntityKind::Case;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            self.description.as_deref(),
            self.location.as_deref(),
            self.criminal_name.as_deref(),
            self.arresting_officer_name.as_deref(),
        ]
    }

    fn category(&self, field: CaseField) -> Option<&str> {
        match field {
            CaseField::Status => self.status.as_deref(),
            CaseField::CrimeType => self.crime_type.as_deref(),
        }
    }
}

// =============================================================================
// EVIDENCE
// =============================================================================

/// Documented evidence types.
pub const EVIDENCE_TYPES: &[(&str, &str)] = &[
    ("PHOTO", "Photograph"),
    ("VIDEO", "Video Recording"),
    ("AUDIO", "Audio Recording"),
    ("DOCUMENT", "Document"),
    ("WEAPON", "Weapon"),
    ("OTHER", "Other Evidence"),
];

/// An evidence item attached to a criminal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Criminal id.
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub criminal: Option<String>,
    /// Resolved client-side, see [`resolve_criminal_names`].
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub criminal_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub evidence_type: Option<String>,
    /// File URL.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub date_collected: Option<NaiveDate>,
    /// Officer id.
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub collected_by: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub collected_by_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
}

/// Categorical fields of an evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceField {
    EvidenceType,
}

impl CategoryField for EvidenceField {
    fn all() -> &'static [Self] {
        &[EvidenceField::EvidenceType]
    }

    fn name(&self) -> &'static str {
        match self {
            EvidenceField::EvidenceType => "evidence_type",
        }
    }

    fn known_values(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            EvidenceField::EvidenceType => EVIDENCE_TYPES,
        }
    }
}

impl Record for Evidence {
    type Field = EvidenceField;
    const KIND: EntityKind = EntityKind::Evidence;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            self.description.as_deref(),
            self.criminal_name.as_deref(),
            self.case_number.as_deref(),
        ]
    }

    fn category(&self, field: EvidenceField) -> Option<&str> {
        match field {
            EvidenceField::EvidenceType => self.evidence_type.as_deref(),
        }
    }
}

/// Fill each evidence item's `criminal_name` from the criminals collection.
///
/// Items whose criminal is missing from `criminals` (or have no criminal at
/// all) get [`UNKNOWN_CRIMINAL`].
pub fn resolve_criminal_names(evidence: Vec<Evidence>, criminals: &[Criminal]) -> Vec<Evidence> {
    evidence
        .into_iter()
        .map(|mut item| {
            let name = item
                .criminal
                .as_deref()
                .and_then(|id| criminals.iter().find(|c| c.id == id))
                .map(Criminal::display_name)
                .unwrap_or_else(|| UNKNOWN_CRIMINAL.to_string());
            item.criminal_name = Some(name);
            item
        })
        .collect()
}

// =============================================================================
// OFFICER
// =============================================================================

/// Documented officer ranks, lowest first.
pub const RANKS: &[(&str, &str)] = &[
    ("CONSTABLE", "Constable"),
    ("SERGEANT", "Sergeant"),
    ("INSPECTOR", "Inspector"),
    ("COMMISSIONER", "Commissioner"),
];

/// Derived activity values (from `is_active`).
pub const ACTIVITY_VALUES: &[(&str, &str)] = &[("active", "Active"), ("inactive", "Inactive")];

/// Login account nested in an officer record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficerUser {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A police officer account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub user: Option<OfficerUser>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub user_full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub badge_number: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub can_activate_users: Option<bool>,
}

impl Officer {
    /// Full name if known, otherwise the badge number.
    pub fn display_name(&self) -> String {
        if let Some(full) = self.user_full_name.as_deref().filter(|s| !s.trim().is_empty()) {
            return full.to_string();
        }
        let user = self.user.as_ref();
        let parts: Vec<&str> = [
            user.and_then(|u| u.first_name.as_deref()),
            user.and_then(|u| u.last_name.as_deref()),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
        if parts.is_empty() {
            self.badge_number.clone().unwrap_or_default()
        } else {
            parts.join(" ")
        }
    }

    /// Derived activity category. Unknown activity reads as inactive.
    pub fn activity(&self) -> Option<&'static str> {
        if self.is_active == Some(true) {
            Some("active")
        } else {
            Some("inactive")
        }
    }

    /// Whether this officer may activate or deactivate `target`.
    ///
    /// Commissioners may activate anyone; inspectors anyone below inspector.
    pub fn can_activate(&self, target: &Officer) -> bool {
        match self.rank.as_deref() {
            Some("COMMISSIONER") => true,
            Some("INSPECTOR") => !matches!(
                target.rank.as_deref(),
                Some("COMMISSIONER") | Some("INSPECTOR")
            ),
            _ => false,
        }
    }
}

/// Categorical fields of an officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficerField {
    Rank,
    Activity,
}

impl CategoryField for OfficerField {
    fn all() -> &'static [Self] {
        &[OfficerField::Rank, OfficerField::Activity]
    }

    fn name(&self) -> &'static str {
        match self {
            OfficerField::Rank => "rank",
            OfficerField::Activity => "activity",
        }
    }

    fn known_values(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            OfficerField::Rank => RANKS,
            OfficerField::Activity => ACTIVITY_VALUES,
        }
    }
}

impl Record for Officer {
    type Field = OfficerField;
    const KIND: EntityKind = EntityKind::Officer;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        let user = self.user.as_ref();
        vec![
            user.and_then(|u| u.first_name.as_deref()),
            user.and_then(|u| u.last_name.as_deref()),
            self.badge_number.as_deref(),
            self.station.as_deref(),
        ]
    }

    fn category(&self, field: OfficerField) -> Option<&str> {
        match field {
            OfficerField::Rank => self.rank.as_deref(),
            OfficerField::Activity => self.activity(),
        }
    }
}
