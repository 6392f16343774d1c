//! Error types for loading and validating policy documents.
//!
//! Evaluation itself is total and never returns these. They surface only
//! where raw documents are read, parsed and checked.

use thiserror::Error;

/// The unified error type for the guard crates.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The document could not be parsed in its declared format, or does not
    /// have the shape of a policy set.
    #[error("failed to parse policy document: {reason}")]
    ParseError { reason: String },

    /// The document declares a `kind` other than `PolicySet`.
    #[error("unsupported kind '{kind}' (expected PolicySet)")]
    UnsupportedKind { kind: String },

    /// A file could not be read, or its format could not be determined.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The JSON Schema document itself could not be compiled.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },
}

/// Convenience alias used throughout the guard crates.
pub type GuardResult<T> = Result<T, GuardError>;
