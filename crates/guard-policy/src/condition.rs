//! Condition evaluation.
//!
//! A [`ConditionMatcher`] is a `Condition` with every pattern compiled. The
//! engine builds one per policy at load time; [`condition_matches`] is the
//! one-shot form for callers holding a bare `Condition`.
//!
//! Rules:
//!
//! - An absent condition matches every context.
//! - An absent filter list is skipped. A present list passes when at least
//!   one of its patterns matches the context value; an empty list never
//!   passes.
//! - For every dimension except the MCP server, an unset context value is
//!   matched as the empty string.
//! - A present `mcp_servers` list fails outright when the context carries no
//!   MCP server at all, even if the list contains `*`.
//! - Present filters are AND-ed.

use guard_contracts::{Condition, EvaluationContext};

use crate::glob::GlobPattern;

/// A compiled list of alternatives for one context dimension.
#[derive(Debug, Clone)]
struct PatternSet(Vec<GlobPattern>);

impl PatternSet {
    fn compile(patterns: &Option<Vec<String>>) -> Option<Self> {
        patterns
            .as_ref()
            .map(|list| Self(list.iter().map(|p| GlobPattern::new(p)).collect()))
    }

    fn any_match(&self, value: &str) -> bool {
        self.0.iter().any(|p| p.is_match(value))
    }
}

/// Absent filter passes; otherwise any pattern must match. Unset values are
/// matched as `""`.
fn filter_passes(filter: &Option<PatternSet>, value: &Option<String>) -> bool {
    match filter {
        None => true,
        Some(set) => set.any_match(value.as_deref().unwrap_or("")),
    }
}

/// A `Condition` ready for repeated evaluation.
#[derive(Debug, Clone)]
pub struct ConditionMatcher {
    modes: Option<PatternSet>,
    models: Option<PatternSet>,
    channels: Option<PatternSet>,
    tools: Option<PatternSet>,
    mcp_servers: Option<PatternSet>,
    risk: Option<PatternSet>,
    users: Option<PatternSet>,
    sessions: Option<PatternSet>,
}

impl ConditionMatcher {
    pub fn compile(condition: &Condition) -> Self {
        Self {
            modes: PatternSet::compile(&condition.modes),
            models: PatternSet::compile(&condition.models),
            channels: PatternSet::compile(&condition.channels),
            tools: PatternSet::compile(&condition.tools),
            mcp_servers: PatternSet::compile(&condition.mcp_servers),
            risk: PatternSet::compile(&condition.risk),
            users: PatternSet::compile(&condition.users),
            sessions: PatternSet::compile(&condition.sessions),
        }
    }

    /// Return true if every present filter passes for `ctx`.
    pub fn matches(&self, ctx: &EvaluationContext) -> bool {
        let aligned = filter_passes(&self.modes, &ctx.mode)
            && filter_passes(&self.models, &ctx.model)
            && filter_passes(&self.channels, &ctx.channel)
            && filter_passes(&self.tools, &ctx.tool)
            && filter_passes(&self.risk, &ctx.risk)
            && filter_passes(&self.users, &ctx.user)
            && filter_passes(&self.sessions, &ctx.session);
        if !aligned {
            return false;
        }

        match (&self.mcp_servers, &ctx.mcp_server) {
            (None, _) => true,
            // "Any MCP server" must not match calls that are not MCP calls.
            (Some(_), None) => false,
            (Some(set), Some(server)) => set.any_match(server),
        }
    }
}

/// Decide whether `condition` matches `ctx`. `None` matches everything.
pub fn condition_matches(condition: Option<&Condition>, ctx: &EvaluationContext) -> bool {
    condition.map_or(true, |c| ConditionMatcher::compile(c).matches(ctx))
}
