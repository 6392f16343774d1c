//! Structural validation report types.
//!
//! Produced by `guard-schema` when a raw policy document is checked against
//! the policy-set JSON Schema. The engine itself never validates.

use serde::{Deserialize, Serialize};

/// The result of validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only if no failure was found.
    pub passed: bool,
    /// Every failure found in the document. Empty on pass.
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn from_failures(failures: Vec<ValidationFailure>) -> Self {
        Self {
            passed: failures.is_empty(),
            failures,
        }
    }
}

/// A single problem within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// JSON Pointer to the offending value (e.g. `/policies/0/effect`).
    /// Empty for the document root.
    pub path: String,
    /// Human-readable explanation.
    pub message: String,
}
