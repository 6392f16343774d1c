//! Priority-ordered policy engine with context fallbacks.
//!
//! `PolicyEngine` holds one snapshot (sorted policies, defaults, fallback
//! map) which `load` replaces wholesale. Every evaluation method is a pure
//! read of that snapshot.
//!
//! Evaluation algorithm:
//!
//! 1. Scan policies in ascending priority (ties in declaration order),
//!    skipping disabled ones. The first whose condition matches wins.
//! 2. If none matched, follow `context_fallbacks` from the context's mode
//!    (unset mode is `""`), retrying step 1 with only the mode replaced.
//!    The walk stops when a mode has no fallback or when the next mode has
//!    already been visited.
//! 3. If the chain ends without a match, return the defaults with no
//!    policy id.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::{debug, info, trace, warn};

use guard_contracts::{
    error::GuardResult, Channel, Defaults, Effect, EvaluationContext, Policy, PolicyMatch,
    PolicySet, Verdict,
};

use crate::condition::ConditionMatcher;
use crate::loader;

/// A policy paired with its compiled condition.
#[derive(Debug, Clone)]
struct LoadedPolicy {
    policy: Policy,
    matcher: Option<ConditionMatcher>,
}

impl LoadedPolicy {
    fn new(policy: &Policy) -> Self {
        Self {
            matcher: policy.condition.as_ref().map(ConditionMatcher::compile),
            policy: policy.clone(),
        }
    }

    /// The condition check alone, ignoring `enabled`.
    fn condition_matches(&self, ctx: &EvaluationContext) -> bool {
        self.matcher.as_ref().map_or(true, |m| m.matches(ctx))
    }

    fn verdict(&self) -> Verdict {
        Verdict::matched(
            self.policy.effect.clone(),
            self.policy.channel.clone().unwrap_or(Channel::CHAT),
            self.policy.id.clone(),
        )
    }
}

/// Evaluates tool invocations against a loaded `PolicySet`.
///
/// Construct empty with `new` (every call returns `ask` / `chat`), or from a
/// set with `with_policy_set` / `from_file`.
///
/// ```rust,ignore
/// use guard_policy::PolicyEngine;
///
/// let engine = PolicyEngine::from_file(Path::new("policies/workstation.yaml"))?;
/// let verdict = engine.evaluate(&EvaluationContext::new().with_tool("bash"));
/// ```
///
/// The engine does no internal locking. Hosts that reload while serving
/// should build a new engine and swap it in behind their own `Arc`/lock
/// rather than calling `load` on a shared instance.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    policies: Vec<LoadedPolicy>,
    default_effect: Effect,
    default_channel: Channel,
    context_fallbacks: BTreeMap<String, String>,
    loaded: bool,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyEngine {
    /// An unloaded engine: no policies, no fallbacks, `ask` / `chat` defaults.
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
            default_effect: Effect::ASK,
            default_channel: Channel::CHAT,
            context_fallbacks: BTreeMap::new(),
            loaded: false,
        }
    }

    /// Build an engine and load `set` into it.
    pub fn with_policy_set(set: &PolicySet) -> Self {
        let mut engine = Self::new();
        engine.load(set);
        engine
    }

    /// Read a policy document from `path` and load it.
    ///
    /// The format is chosen from the file extension. See [`loader::load_policy_set`].
    pub fn from_file(path: &Path) -> GuardResult<Self> {
        let set = loader::load_policy_set(path)?;
        Ok(Self::with_policy_set(&set))
    }

    /// Replace the engine's whole snapshot with `set`.
    ///
    /// Policies are copied and sorted by priority; unset defaults become
    /// `ask` / `chat`; the fallback map is copied as-is, cycles included.
    pub fn load(&mut self, set: &PolicySet) {
        warn_on_authoring_mistakes(set);

        let mut policies: Vec<LoadedPolicy> = set.policies.iter().map(LoadedPolicy::new).collect();
        // `sort_by_key` is stable: equal priorities keep declaration order.
        policies.sort_by_key(|p| p.policy.priority);

        *self = Self {
            policies,
            default_effect: set.defaults.effect_or_ask(),
            default_channel: set.defaults.channel_or_chat(),
            context_fallbacks: set.context_fallbacks.clone(),
            loaded: true,
        };

        info!(
            policy_set = %set.metadata.name,
            policies = self.policies.len(),
            fallbacks = self.context_fallbacks.len(),
            default_effect = %self.default_effect,
            "policy set loaded"
        );
    }

    /// True once `load` has been called at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The loaded policies in evaluation order.
    pub fn policies(&self) -> Vec<Policy> {
        self.policies.iter().map(|p| p.policy.clone()).collect()
    }

    /// The defaults in effect, with both fields filled.
    pub fn defaults(&self) -> Defaults {
        Defaults::new(self.default_effect.clone(), self.default_channel.clone())
    }

    /// The fallback map as loaded.
    pub fn context_fallbacks(&self) -> BTreeMap<String, String> {
        self.context_fallbacks.clone()
    }

    /// Evaluate `ctx` and return the verdict.
    ///
    /// Never fails: when nothing matches through the whole fallback chain
    /// the defaults are returned with `policy_id: None`.
    pub fn evaluate(&self, ctx: &EvaluationContext) -> Verdict {
        if let Some(verdict) = self.evaluate_once(ctx) {
            return verdict;
        }

        let mut mode = ctx.mode_key();
        let mut visited: HashSet<&str> = HashSet::from([mode]);

        while let Some(next) = self.context_fallbacks.get(mode) {
            let next = next.as_str();
            if !visited.insert(next) {
                debug!(from = mode, to = next, "fallback cycle detected; stopping");
                break;
            }

            trace!(from = mode, to = next, tool = ?ctx.tool, "trying fallback mode");
            if let Some(verdict) = self.evaluate_once(&ctx.with_mode_replaced(next)) {
                return verdict;
            }
            mode = next;
        }

        debug!(
            tool = ?ctx.tool,
            mode = ?ctx.mode,
            effect = %self.default_effect,
            "no policy matched; applying defaults"
        );
        Verdict::from_defaults(self.default_effect.clone(), self.default_channel.clone())
    }

    /// The effect of `evaluate(ctx)`, as a plain string.
    pub fn resolve(&self, ctx: &EvaluationContext) -> String {
        self.evaluate(ctx).effect.into_string()
    }

    /// Report every policy, in evaluation order, against `ctx` exactly as
    /// given. No fallback walk; never the basis of a verdict.
    pub fn evaluate_all(&self, ctx: &EvaluationContext) -> Vec<PolicyMatch> {
        self.policies
            .iter()
            .map(|loaded| {
                let policy = &loaded.policy;
                let condition_matched = loaded.condition_matches(ctx);
                PolicyMatch {
                    policy_id: policy.id.clone(),
                    name: policy.name.clone(),
                    priority: policy.priority,
                    effect: policy.effect.clone(),
                    matched: policy.enabled && condition_matched,
                    enabled: policy.enabled,
                }
            })
            .collect()
    }

    /// One scan of the sorted policies with no fallback.
    fn evaluate_once(&self, ctx: &EvaluationContext) -> Option<Verdict> {
        let hit = self
            .policies
            .iter()
            .filter(|p| p.policy.enabled)
            .find(|p| p.condition_matches(ctx))?;

        debug!(
            policy_id = %hit.policy.id,
            effect = %hit.policy.effect,
            tool = ?ctx.tool,
            mode = ?ctx.mode,
            "policy matched"
        );
        Some(hit.verdict())
    }
}

/// Log conditions that load fine but can never match.
fn warn_on_authoring_mistakes(set: &PolicySet) {
    for policy in &set.policies {
        let Some(condition) = &policy.condition else {
            continue;
        };
        for (field, patterns) in condition.filters() {
            if patterns.is_empty() {
                warn!(
                    policy_id = %policy.id,
                    field,
                    "condition list is empty; this filter can never match"
                );
            } else if patterns.iter().any(String::is_empty) {
                warn!(
                    policy_id = %policy.id,
                    field,
                    "condition contains a blank pattern, which never matches"
                );
            }
        }
    }
}
