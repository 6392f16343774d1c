//! Wildcard matching for condition patterns.
//!
//! Pattern language:
//!
//! - `*` matches zero or more characters, `?` matches exactly one.
//! - Every other character matches itself, including characters that are
//!   special in regex or shell globs (`[`, `.`, `\`, ...).
//! - Matching is anchored at both ends and case-sensitive.
//! - The empty pattern matches nothing; `"*"` matches everything, including
//!   the empty string.

use regex::Regex;
use tracing::warn;

/// A pattern compiled once and matched many times.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    kind: PatternKind,
}

#[derive(Debug, Clone)]
enum PatternKind {
    /// The blank pattern.
    Never,
    /// The bare `*` pattern.
    Any,
    /// No wildcard characters: plain string equality.
    Literal,
    Wildcard(Regex),
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Self {
        let kind = if pattern.is_empty() {
            PatternKind::Never
        } else if pattern == "*" {
            PatternKind::Any
        } else if !pattern.contains(['*', '?']) {
            PatternKind::Literal
        } else {
            match Regex::new(&wildcard_regex(pattern)) {
                Ok(re) => PatternKind::Wildcard(re),
                Err(e) => {
                    // Only reachable for pathological sizes; match literally instead.
                    warn!(
                        pattern,
                        error = %e,
                        "failed to compile glob pattern; matching it literally"
                    );
                    PatternKind::Literal
                }
            }
        };

        Self {
            source: pattern.to_string(),
            kind,
        }
    }

    /// Return true if `value` matches the whole pattern.
    pub fn is_match(&self, value: &str) -> bool {
        match &self.kind {
            PatternKind::Never => false,
            PatternKind::Any => true,
            PatternKind::Literal => self.source == value,
            PatternKind::Wildcard(re) => re.is_match(value),
        }
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Match a single `value` against `pattern`.
///
/// Compiles the pattern on every call; use [`GlobPattern`] on hot paths.
pub fn glob_match(pattern: &str, value: &str) -> bool {
    GlobPattern::new(pattern).is_match(value)
}

/// Translate a wildcard pattern into an anchored regex. `(?s)` lets `?` and
/// `*` consume newlines like any other character.
fn wildcard_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str(r"(?s)\A");
    let mut buf = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(ch.encode_utf8(&mut buf))),
        }
    }
    out.push_str(r"\z");
    out
}
