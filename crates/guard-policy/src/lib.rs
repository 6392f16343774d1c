//! # guard-policy
//!
//! A declarative, priority-ordered guardrail policy engine.
//!
//! ## Overview
//!
//! This crate provides [`PolicyEngine`], which evaluates an
//! [`EvaluationContext`](guard_contracts::EvaluationContext) against a loaded
//! [`PolicySet`](guard_contracts::PolicySet) and returns a
//! [`Verdict`](guard_contracts::Verdict): an effect string, an approval
//! channel, and the id of the policy that decided it (or none when the
//! defaults applied).
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use guard_contracts::EvaluationContext;
//! use guard_policy::PolicyEngine;
//!
//! let engine = PolicyEngine::from_file(Path::new("policies/workstation.yaml"))?;
//! let effect = engine.resolve(&EvaluationContext::new().with_tool("bash").with_mode("background"));
//! ```
//!
//! ## Rule matching
//!
//! Condition patterns support `*` and `?` wildcards (see [`glob`]). Policies
//! are tried in ascending priority, ties in declaration order, and the first
//! enabled match wins. When nothing matches, the engine retries with the
//! modes named by `context_fallbacks` before falling back to the defaults.

pub mod condition;
pub mod engine;
pub mod glob;
pub mod loader;

pub use condition::{condition_matches, ConditionMatcher};
pub use engine::PolicyEngine;
pub use glob::{glob_match, GlobPattern};
pub use loader::{load_policy_set, policy_set_from_str, read_document, DocumentFormat};

// ── Tests ─────────────────────────────────────────────────────────────────────
