//! Field rules applied to user payloads before they reach the store.
//!
//! | Field  | Rules            |
//! |--------|------------------|
//! | `name` | required         |
//! | `age`  | required, min=0  |
//!
//! `required` treats the zero value as missing, so an empty name and an age
//! of `0` both fail it. All violations are collected, so a payload with several problems reports
//! them together.

use std::fmt;

use crate::model::{NewUser, UserPayload};

/// The constraint a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Min(i64),
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("required"),
            Rule::Min(min) => write!(f, "min={min}"),
        }
    }
}

/// A single rule violation on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub rule: Rule,
    pub message: String,
}

impl FieldViolation {
    fn required(field: &'static str) -> Self {
        Self {
            field,
            rule: Rule::Required,
            message: format!("{field} is required"),
        }
    }

    fn min(field: &'static str, min: i64) -> Self {
        Self {
            field,
            rule: Rule::Min(min),
            message: format!("{field} must be {min} or greater"),
        }
    }
}

/// Non-empty list of violations for one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns the violation recorded for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(&violation.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

const MIN_AGE: i64 = 0;

/// Checks a payload against the user rules.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing every failed rule when `name` is
/// missing or empty, or when `age` is missing, zero or negative.
pub fn validate_user(payload: &UserPayload) -> Result<NewUser, ValidationErrors> {
    let mut violations = Vec::new();

    let name = match payload.name.as_deref() {
        Some(name) if !name.is_empty() => Some(name),
        _ => {
            violations.push(FieldViolation::required("name"));
            None
        }
    };

    let age = match payload.age {
        None | Some(0) => {
            violations.push(FieldViolation::required("age"));
            None
        }
        Some(age) if age < MIN_AGE => {
            violations.push(FieldViolation::min("age", MIN_AGE));
            None
        }
        Some(age) => Some(age),
    };

    match (name, age) {
        (Some(name), Some(age)) => Ok(NewUser::new(name, age)),
        _ => Err(ValidationErrors { violations }),
    }
}
