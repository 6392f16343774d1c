//! # guard-schema
//!
//! Structural validation for policy-set documents.
//!
//! The engine deliberately trusts whatever `PolicySet` it is given. This
//! crate is where authoring mistakes get caught before a document reaches
//! it:
//!
//! 1. **Structural**: [`PolicySetValidator`] checks the raw document tree
//!    against an embedded JSON Schema using the `jsonschema` crate (the
//!    `kind` discriminator, required fields, non-empty effects, id format,
//!    priority range, unknown keys).
//! 2. **Lint**: [`duplicate_policy_ids`] reports what JSON Schema cannot
//!    express.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use guard_policy::loader::{parse_document, DocumentFormat};
//! use guard_schema::PolicySetValidator;
//!
//! let document = parse_document(&text, DocumentFormat::Yaml)?;
//! let report = PolicySetValidator::new()?.validate(&document);
//! for failure in &report.failures {
//!     eprintln!("{}: {}", failure.path, failure.message);
//! }
//! ```

pub mod lint;
pub mod validator;

pub use lint::duplicate_policy_ids;
pub use validator::{policy_set_schema, PolicySetValidator, POLICY_SET_SCHEMA};

// ── Tests ─────────────────────────────────────────────────────────────────────
