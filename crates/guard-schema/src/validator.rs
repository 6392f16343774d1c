//! JSON Schema validation of raw policy documents.
//!
//! `PolicySetValidator` compiles the embedded policy-set schema once and
//! checks value trees produced by `guard_policy::loader::parse_document`.
//! All violations are collected before returning so authors see the full
//! failure set in one pass.

use serde_json::Value;
use tracing::{debug, warn};

use guard_contracts::{
    error::{GuardError, GuardResult},
    ValidationFailure, ValidationReport,
};

/// The policy-set JSON Schema document (draft 2020-12).
pub const POLICY_SET_SCHEMA: &str = include_str!("../schema/policy-set.schema.json");

/// Parse the embedded schema document.
pub fn policy_set_schema() -> GuardResult<Value> {
    serde_json::from_str(POLICY_SET_SCHEMA).map_err(|e| GuardError::SchemaValidation {
        reason: format!("embedded policy-set schema is not valid JSON: {e}"),
    })
}

/// Structural validator for policy-set documents.
pub struct PolicySetValidator {
    validator: jsonschema::Validator,
}

impl PolicySetValidator {
    /// Compile the embedded schema.
    ///
    /// Returns `GuardError::SchemaValidation` if the schema cannot be compiled.
    pub fn new() -> GuardResult<Self> {
        Self::with_schema(&policy_set_schema()?)
    }

    /// Compile a caller-supplied schema instead of the embedded one.
    pub fn with_schema(schema: &Value) -> GuardResult<Self> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| GuardError::SchemaValidation {
                reason: format!("invalid JSON Schema document: {e}"),
            })?;
        Ok(Self { validator })
    }

    /// Validate `document` and report every violation.
    pub fn validate(&self, document: &Value) -> ValidationReport {
        let failures: Vec<ValidationFailure> = self
            .validator
            .iter_errors(document)
            .map(|error| {
                let failure = ValidationFailure {
                    path: error.instance_path.to_string(),
                    message: error.to_string(),
                };
                warn!(
                    path = %failure.path,
                    message = %failure.message,
                    "policy document violates schema"
                );
                failure
            })
            .collect();

        let report = ValidationReport::from_failures(failures);
        debug!(
            passed = report.passed,
            failures = report.failures.len(),
            "policy document validated"
        );
        report
    }
}
