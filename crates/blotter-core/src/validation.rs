//! Officer registration validation.
//!
//! Each check is a named entry in a validator table; running the table
//! yields every failed rule as a structured [`FieldError`], in table order,
//! instead of stopping at the first problem.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defaults::{PASSWORD_MIN_LENGTH, PASSWORD_SPECIAL_CHARS};
use crate::models::RANKS;

static LOWERCASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").expect("static regex"));
static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").expect("static regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").expect("static regex"));
static SPECIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("[{}]", regex::escape(PASSWORD_SPECIAL_CHARS))).expect("static regex")
});
static BADGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^P[0-9]{5}$").expect("static regex"));

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Form field the rule applies to.
    pub field: String,
    /// Stable rule name (e.g. `"password.uppercase"`).
    pub rule: String,
    /// Message shown next to the field.
    pub message: String,
}

/// A named single-value check.
pub struct Validator {
    pub rule: &'static str,
    pub message: &'static str,
    check: fn(&str) -> bool,
}

impl Validator {
    /// Whether `value` satisfies this rule.
    pub fn passes(&self, value: &str) -> bool {
        (self.check)(value)
    }
}

/// Password strength rules, in display order.
pub static PASSWORD_RULES: &[Validator] = &[
    Validator {
        rule: "password.min_length",
        message: "Password must be at least 8 characters long",
        check: |v| v.chars().count() >= PASSWORD_MIN_LENGTH,
    },
    Validator {
        rule: "password.lowercase",
        message: "Password must contain at least one lowercase letter",
        check: |v| LOWERCASE.is_match(v),
    },
    Validator {
        rule: "password.uppercase",
        message: "Password must contain at least one uppercase letter",
        check: |v| UPPERCASE.is_match(v),
    },
    Validator {
        rule: "password.digit",
        message: "Password must contain at least one number",
        check: |v| DIGIT.is_match(v),
    },
    Validator {
        rule: "password.special",
        message: "Password must contain at least one special character (@$!%*?&)",
        check: |v| SPECIAL.is_match(v),
    },
];

/// Badge number format rule.
pub static BADGE_RULE: Validator = Validator {
    rule: "badge_number.format",
    message: "Badge number must be in format: P followed by 5 numbers (e.g., P12345)",
    check: |v| BADGE.is_match(v),
};

fn run(field: &str, value: &str, rules: &[Validator]) -> Vec<FieldError> {
    rules
        .iter()
        .filter(|r| !r.passes(value))
        .map(|r| FieldError {
            field: field.to_string(),
            rule: r.rule.to_string(),
            message: r.message.to_string(),
        })
        .collect()
}

/// Every unmet password rule.
pub fn validate_password(password: &str) -> Vec<FieldError> {
    run("password", password, PASSWORD_RULES)
}

/// `P` followed by exactly five digits.
pub fn is_valid_badge_number(badge: &str) -> bool {
    BADGE_RULE.passes(badge)
}

/// Accumulated result of validating a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors attached to one field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    fn push(&mut self, field: &str, rule: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        });
    }
}

/// Officer self-registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub badge_number: String,
    pub rank: String,
    pub station: String,
}

impl RegistrationForm {
    /// Run every registration rule.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (field, value) in [
            ("username", &self.username),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("station", &self.station),
        ] {
            if value.trim().is_empty() {
                report.push(field, "required", format!("{} is required", field));
            }
        }

        if !self.email.trim().is_empty() && !self.email.contains('@') {
            report.push("email", "email.format", "Enter a valid email address");
        }

        if self.password != self.confirm_password {
            report.push("confirm_password", "password.match", "Passwords do not match");
        }
        report.errors.extend(validate_password(&self.password));

        if !is_valid_badge_number(&self.badge_number) {
            report.push("badge_number", BADGE_RULE.rule, BADGE_RULE.message);
        }

        if !RANKS.iter().any(|(value, _)| *value == self.rank) {
            report.push("rank", "rank.known", format!("Unknown rank: {}", self.rank));
        }

        debug!(error_count = report.errors.len(), "Validated registration form");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            username: "mchen".into(),
            password: "Secur3&pass".into(),
            confirm_password: "Secur3&pass".into(),
            first_name: "Maria".into(),
            last_name: "Chen".into(),
            email: "mchen@police.example".into(),
            badge_number: "P12345".into(),
            rank: "SERGEANT".into(),
            station: "Westside".into(),
        }
    }

    #[test]
    fn test_badge_numbers() {
        assert!(is_valid_badge_number("P12345"));
        assert!(!is_valid_badge_number("p12345"));
        assert!(!is_valid_badge_number("P1234"));
        assert!(!is_valid_badge_number("P123456"));
        assert!(!is_valid_badge_number("X12345"));
        assert!(!is_valid_badge_number(""));
    }

    #[test]
    fn test_weak_password_lists_every_rule_in_order() {
        let rules: Vec<String> = validate_password("weak").into_iter().map(|e| e.rule).collect();
        assert_eq!(
            rules,
            vec![
                "password.min_length",
                "password.uppercase",
                "password.digit",
                "password.special",
            ]
        );
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(validate_password("Str0ng!pass").is_empty());
    }

    #[test]
    fn test_valid_form() {
        let report = valid_form().validate();
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn test_mismatched_confirmation_and_bad_badge() {
        let form = RegistrationForm {
            confirm_password: "different".into(),
            badge_number: "12345".into(),
            ..valid_form()
        };
        let report = form.validate();
        assert!(!report.is_valid());
        assert_eq!(report.for_field("confirm_password").count(), 1);
        assert_eq!(
            report.for_field("badge_number").next().map(|e| e.rule.as_str()),
            Some("badge_number.format")
        );
    }

    #[test]
    fn test_required_fields_and_rank() {
        let form = RegistrationForm {
            station: "  ".into(),
            rank: "CAPTAIN".into(),
            ..valid_form()
        };
        let report = form.validate();
        assert_eq!(report.for_field("station").count(), 1);
        assert_eq!(report.for_field("rank").count(), 1);
    }
}
