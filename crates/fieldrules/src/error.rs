//! Error and violation types
//!
//! Two taxonomies live here and are never mixed: [`Error`] is a build or
//! programmer fault that aborts registration or validation, while
//! [`Violation`] is a business-rule failure reported back to the caller.

use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ValidationResult<T> = Result<T, Error>;

/// Violation codes for the built-in checks.
pub mod codes {
    pub const REQUIRED: &str = "required";
    pub const MAX: &str = "max";
    pub const MIN: &str = "min";
    pub const PATTERN: &str = "regex";
    pub const NOT_IN: &str = "in";
    pub const RECORD: &str = "record";
}

/// Build-time and programmer errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("only records can be validated, found {0}")]
    NotRecord(&'static str),

    #[error("{0} is not registered")]
    NotRegistered(&'static str),

    #[error("{0} is already registered")]
    AlreadyRegistered(&'static str),

    #[error("rule name `{0}` is reserved")]
    ReservedRule(String),

    #[error("model registration error ({model}.{field} `{rule}`): unknown rule")]
    UnknownRule {
        model: &'static str,
        field: &'static str,
        rule: String,
    },

    #[error("model registration error ({model}.{field} `{rule}`): not supported on {kind} fields")]
    UnsupportedRule {
        model: &'static str,
        field: &'static str,
        rule: String,
        kind: &'static str,
    },

    #[error("model registration error ({model}.{field} `{rule}`): {reason}")]
    MalformedRule {
        model: &'static str,
        field: &'static str,
        rule: String,
        reason: String,
    },

    #[error("model registration error ({model}.{field} `regex:{pattern}`): {source}")]
    Pattern {
        model: &'static str,
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{field}: rule `{rule}` failed: {source}")]
    Rule {
        field: String,
        rule: String,
        #[source]
        source: RuleError,
    },

    #[error("{model}: record validator failed: {source}")]
    RecordRule {
        model: &'static str,
        #[source]
        source: RuleError,
    },

    #[error("{field}: expected a {expected} value, found {found}")]
    Mismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{field}: records nested deeper than {limit} levels")]
    TooDeep { field: String, limit: usize },
}

/// Failure raised by a custom rule that was applied where it makes no sense,
/// e.g. a text-only rule on an integer field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RuleError(pub String);

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A single business-rule failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    /// Path of the failing value, e.g. `Tags[1]` or `Address.City`
    pub field: String,
    /// Human-readable message, already naming the field
    pub message: String,
    /// Which check failed
    pub code: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }

    pub(crate) fn required(field: &str) -> Self {
        Self::new(field, format!("{field} is required"), codes::REQUIRED)
    }

    /// Index of the innermost sequence element in the field path, if any
    pub fn index(&self) -> Option<usize> {
        let end = self.field.rfind(']')?;
        let start = self.field[..end].rfind('[')?;
        self.field[start + 1..end].parse().ok()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered collection of violations, in the order the checks ran
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violations {
    items: Vec<Violation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.items.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn first(&self) -> Option<&Violation> {
        self.items.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.items.iter()
    }

    /// Messages only, in order
    pub fn messages(&self) -> Vec<&str> {
        self.items.iter().map(|v| v.message.as_str()).collect()
    }

    /// Violations whose path is exactly `field`
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.items.iter().filter(move |v| v.field == field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.for_field(field).next().is_some()
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.items
    }

    /// Convert to a JSON-serializable format for API responses
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": "validation_failed",
                "message": "Validation failed",
                "violations": self.items
            }
        })
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return write!(f, "No violations");
        }
        write!(f, "{} violation(s):", self.items.len())?;
        for violation in &self.items {
            write!(f, "\n  {}", violation.message)?;
        }
        Ok(())
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(items: Vec<Violation>) -> Self {
        Self { items }
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
