//! Rule-based validation of message fields.
//!
//! Validation only reads values through [`Message::get`], so it sees exactly
//! what a caller of the path API would see: missing and malformed paths read
//! as empty.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::Message;

mod rules;
pub use rules::{DataType, LoadError, Rule, RuleSet};

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// The path the failing rule checks.
    pub path: String,
    /// What was wrong with the value.
    pub message: String,
}

/// The outcome of validating one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    failures: Vec<Failure>,
}

impl Report {
    /// Whether every rule passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// The failures, in rule order.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    fn fail(&mut self, rule: &Rule, message: String) {
        self.failures.push(Failure {
            path: rule.path.clone(),
            message,
        });
    }
}

impl RuleSet {
    /// Checks `message` against every rule.
    #[must_use]
    pub fn validate(&self, message: &Message) -> Report {
        let mut report = Report::default();
        for rule in self.rules() {
            rule.check(message.get(&rule.path), &mut report);
        }
        report
    }
}

impl Rule {
    fn check(&self, value: &str, report: &mut Report) {
        if value.trim().is_empty() {
            if self.required {
                report.fail(self, "required field is missing".to_owned());
            }
            return;
        }

        if let Some(max) = self.max_length {
            if value.chars().count() > max {
                report.fail(self, format!("exceeds maximum length of {max}"));
            }
        }

        if let Some(allowed) = &self.allowed_values {
            if !allowed.iter().any(|candidate| candidate == value) {
                report.fail(
                    self,
                    format!(
                        "value '{value}' is not one of the allowed values: {}",
                        allowed.join(", ")
                    ),
                );
            }
        }

        if let Some(data_type) = self.data_type {
            if !data_type.matches(value) {
                report.fail(self, data_type.failure_message().to_owned());
            }
        }
    }
}

impl DataType {
    fn matches(self, value: &str) -> bool {
        let digits = value.bytes().all(|b| b.is_ascii_digit());
        match self {
            Self::Date => {
                digits
                    && value.len() == 8
                    && NaiveDate::parse_from_str(value, "%Y%m%d").is_ok()
            }
            Self::DateTime => {
                digits
                    && match value.len() {
                        12 => NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M").is_ok(),
                        14 => NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S").is_ok(),
                        _ => false,
                    }
            }
            Self::Numeric => is_numeric(value),
        }
    }

    const fn failure_message(self) -> &'static str {
        match self {
            Self::Date => "invalid date",
            Self::DateTime => "invalid datetime",
            Self::Numeric => "not a number",
        }
    }
}

/// An optionally signed decimal: `12`, `-3.5`, `+.25`.
fn is_numeric(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let mut parts = unsigned.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    !(whole.is_empty() && fraction.is_empty()) && all_digits(whole) && all_digits(fraction)
}
