//! # guard-contracts
//!
//! Shared types for the guard policy evaluator.
//!
//! All crates in the workspace import from here. No evaluation logic lives in
//! this crate, only data definitions and error types.

pub mod context;
pub mod effect;
pub mod error;
pub mod policy;
pub mod validation;
pub mod verdict;

pub use context::EvaluationContext;
pub use effect::{Channel, Effect};
pub use error::{GuardError, GuardResult};
pub use policy::{Condition, Defaults, Metadata, Policy, PolicySet};
pub use validation::{ValidationFailure, ValidationReport};
pub use verdict::{PolicyMatch, Verdict};

#[cfg(test)]
mod tests {
    use super::*;

    // ── Effect / Channel ─────────────────────────────────────────────────────

    #[test]
    fn effect_constants_equal_constructed_values() {
        assert_eq!(Effect::new("allow"), Effect::ALLOW);
        assert_eq!(Effect::from("hitl"), Effect::HITL);
        assert_eq!(Effect::from("pitl".to_string()), Effect::PITL);
        assert_eq!(Channel::new("phone"), Channel::PHONE);
    }

    #[test]
    fn effect_does_not_fold_aliases() {
        // "ask" and "hitl" are distinct strings; the engine never folds them.
        assert_ne!(Effect::ASK, Effect::HITL);
    }

    #[test]
    fn custom_effect_is_passed_through() {
        let custom = Effect::new("my-org-mfa");
        assert_eq!(custom.as_str(), "my-org-mfa");
        assert_eq!(custom, "my-org-mfa");
        assert_eq!(custom.to_string(), "my-org-mfa");
        assert_eq!(custom.into_string(), "my-org-mfa".to_string());
    }

    #[test]
    fn effect_and_channel_defaults() {
        assert_eq!(Effect::default(), Effect::ASK);
        assert_eq!(Channel::default(), Channel::CHAT);
    }

    #[test]
    fn effect_serializes_as_bare_string() {
        let json = serde_json::to_string(&Effect::DENY).unwrap();
        assert_eq!(json, "\"deny\"");

        let decoded: Effect = serde_json::from_str("\"my-org-auth\"").unwrap();
        assert_eq!(decoded, Effect::new("my-org-auth"));
    }

    // ── EvaluationContext ────────────────────────────────────────────────────

    #[test]
    fn context_fields_start_unset() {
        let ctx = EvaluationContext::new();
        assert_eq!(ctx.mode, None);
        assert_eq!(ctx.mcp_server, None);
        assert_eq!(ctx.mode_key(), "");
    }

    #[test]
    fn context_builder_sets_fields() {
        let ctx = EvaluationContext::new()
            .with_tool("bash")
            .with_mode("background")
            .with_mcp_server("")
            .with_user("admin-alice");

        assert_eq!(ctx.tool.as_deref(), Some("bash"));
        assert_eq!(ctx.mode_key(), "background");
        // An empty MCP server name is still a value, distinct from unset.
        assert_eq!(ctx.mcp_server.as_deref(), Some(""));
        assert_eq!(ctx.user.as_deref(), Some("admin-alice"));
    }

    #[test]
    fn mode_replacement_keeps_other_fields() {
        let ctx = EvaluationContext::new()
            .with_tool("bash")
            .with_mode("scheduler")
            .with_risk("high");

        let retried = ctx.with_mode_replaced("background");

        assert_eq!(retried.mode.as_deref(), Some("background"));
        assert_eq!(retried.tool, ctx.tool);
        assert_eq!(retried.risk, ctx.risk);
        // The original is untouched.
        assert_eq!(ctx.mode.as_deref(), Some("scheduler"));
    }

    // ── Policy model ─────────────────────────────────────────────────────────

    #[test]
    fn policy_new_applies_documented_defaults() {
        let policy = Policy::new("p1", Effect::ALLOW);
        assert!(policy.enabled);
        assert_eq!(policy.priority, policy::DEFAULT_PRIORITY);
        assert_eq!(policy.condition, None);
        assert_eq!(policy.channel, None);
    }

    #[test]
    fn condition_filters_distinguishes_absent_from_empty() {
        let cond = Condition::new()
            .with_tools(["bash", "grep"])
            .with_mcp_servers(Vec::<String>::new());

        let filters: Vec<(&str, usize)> = cond.filters().map(|(n, p)| (n, p.len())).collect();
        assert_eq!(filters, vec![("tools", 2), ("mcp_servers", 0)]);
    }

    #[test]
    fn defaults_fall_back_to_ask_and_chat() {
        let unset = Defaults::default();
        assert_eq!(unset.effect_or_ask(), Effect::ASK);
        assert_eq!(unset.channel_or_chat(), Channel::CHAT);

        let deny = Defaults::with_effect(Effect::DENY);
        assert_eq!(deny.effect_or_ask(), Effect::DENY);
        assert_eq!(deny.channel_or_chat(), Channel::CHAT);
    }

    #[test]
    fn policy_set_deserializes_with_defaults_filled() {
        let json = r#"{
            "metadata": { "name": "minimal" },
            "policies": [ { "id": "p1", "effect": "deny" } ]
        }"#;

        let set: PolicySet = serde_json::from_str(json).unwrap();

        assert_eq!(set.api_version, policy::DEFAULT_API_VERSION);
        assert_eq!(set.kind, policy::POLICY_SET_KIND);
        assert_eq!(set.defaults, Defaults::default());
        assert!(set.context_fallbacks.is_empty());
        assert_eq!(set.policies[0].priority, 100);
        assert!(set.policies[0].enabled);
        assert_eq!(set.policies[0].channel, None);
    }

    #[test]
    fn explicit_zero_priority_is_kept() {
        let json = r#"{ "id": "p0", "effect": "allow", "priority": 0 }"#;
        let policy: Policy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.priority, 0);
    }

    #[test]
    fn absent_condition_lists_are_not_serialized() {
        let cond = Condition::new().with_tools(["bash"]);
        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json, serde_json::json!({ "tools": ["bash"] }));
    }

    // ── Verdict ──────────────────────────────────────────────────────────────

    #[test]
    fn verdict_default_flag() {
        let matched = Verdict::matched(Effect::DENY, Channel::CHAT, "p1");
        assert!(!matched.is_default());

        let fallback = Verdict::from_defaults(Effect::ASK, Channel::CHAT);
        assert!(fallback.is_default());
        assert_eq!(fallback.policy_id, None);
    }

    // ── ValidationReport ─────────────────────────────────────────────────────

    #[test]
    fn validation_report_passes_only_without_failures() {
        assert!(ValidationReport::from_failures(vec![]).passed);

        let report = ValidationReport::from_failures(vec![ValidationFailure {
            path: "/policies/0/effect".to_string(),
            message: "\"\" is shorter than 1 character".to_string(),
        }]);
        assert!(!report.passed);
        assert_eq!(report.failures.len(), 1);
    }

    // ── GuardError display messages ──────────────────────────────────────────

    #[test]
    fn error_parse_error_display() {
        let err = GuardError::ParseError {
            reason: "expected a mapping".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to parse policy document"));
        assert!(msg.contains("expected a mapping"));
    }

    #[test]
    fn error_unsupported_kind_display() {
        let err = GuardError::UnsupportedKind {
            kind: "RoleBinding".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("RoleBinding"));
        assert!(msg.contains("expected PolicySet"));
    }

    #[test]
    fn error_config_error_display() {
        let err = GuardError::ConfigError {
            reason: "unknown extension 'ini'".to_string(),
        };
        assert!(err.to_string().contains("configuration error"));
    }
}
