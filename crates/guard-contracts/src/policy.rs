//! Policy set data model.
//!
//! A `PolicySet` is a pure value: metadata, defaults, an ordered list of
//! `Policy` rules and a mode-to-mode fallback map. It is produced by a loader
//! (or built in code) and handed wholesale to an engine. Nothing in this
//! module evaluates anything.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::effect::{Channel, Effect};

/// The `apiVersion` written into documents that do not declare one.
pub const DEFAULT_API_VERSION: &str = "agent-policy/v1";

/// The only document `kind` a policy set loader accepts.
pub const POLICY_SET_KIND: &str = "PolicySet";

/// Priority assigned to policies that do not declare one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Matching criteria for a policy.
///
/// Each field is a list of glob patterns filtering one context dimension.
/// Within a list patterns are OR-ed; across lists the filters are AND-ed.
/// `None` means "don't care". `Some(vec![])` is kept as written: it can never
/// match, which is almost certainly an authoring mistake but not an error.
///
/// Example in YAML:
/// ```yaml
/// condition:
///   modes: [background]
///   tools: ["mcp:github-*", bash]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
    /// Filters the context's request channel, not the verdict channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    /// When present, contexts without an MCP server never match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<String>>,
}

fn pattern_list<I, S>(patterns: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(patterns.into_iter().map(Into::into).collect())
}

impl Condition {
    /// A condition with no filters. Matches every context.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modes<I: IntoIterator<Item = S>, S: Into<String>>(mut self, patterns: I) -> Self {
        self.modes = pattern_list(patterns);
        self
    }

    pub fn with_models<I: IntoIterator<Item = S>, S: Into<String>>(mut self, patterns: I) -> Self {
        self.models = pattern_list(patterns);
        self
    }

    pub fn with_channels<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        patterns: I,
    ) -> Self {
        self.channels = pattern_list(patterns);
        self
    }

    pub fn with_tools<I: IntoIterator<Item = S>, S: Into<String>>(mut self, patterns: I) -> Self {
        self.tools = pattern_list(patterns);
        self
    }

    pub fn with_mcp_servers<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        patterns: I,
    ) -> Self {
        self.mcp_servers = pattern_list(patterns);
        self
    }

    pub fn with_risk<I: IntoIterator<Item = S>, S: Into<String>>(mut self, patterns: I) -> Self {
        self.risk = pattern_list(patterns);
        self
    }

    pub fn with_users<I: IntoIterator<Item = S>, S: Into<String>>(mut self, patterns: I) -> Self {
        self.users = pattern_list(patterns);
        self
    }

    pub fn with_sessions<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        patterns: I,
    ) -> Self {
        self.sessions = pattern_list(patterns);
        self
    }

    /// Every declared filter as `(field name, patterns)`, in document order.
    pub fn filters(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        [
            ("modes", &self.modes),
            ("models", &self.models),
            ("channels", &self.channels),
            ("tools", &self.tools),
            ("mcp_servers", &self.mcp_servers),
            ("risk", &self.risk),
            ("users", &self.users),
            ("sessions", &self.sessions),
        ]
        .into_iter()
        .filter_map(|(name, list)| list.as_deref().map(|patterns| (name, patterns)))
    }
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// A single guardrail rule.
///
/// Policies are tried in ascending `priority`; equal priorities keep their
/// declaration order. The first enabled policy whose condition matches
/// decides the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Stable identifier reported in verdicts and diagnostics.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Passed through verbatim to the verdict. Never interpreted.
    pub effect: Effect,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Lower values are tried first. Conventionally 0..=9999, not enforced.
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// `None` matches every context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,

    /// Approval channel override. `None` means `chat`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
}

impl Policy {
    /// An enabled, match-all policy at the default priority.
    pub fn new(id: impl Into<String>, effect: impl Into<Effect>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            effect: effect.into(),
            enabled: true,
            priority: DEFAULT_PRIORITY,
            condition: None,
            channel: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_channel(mut self, channel: impl Into<Channel>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Fallback behaviour when no policy matches anywhere in the fallback chain.
///
/// Unset fields are filled with `ask` / `chat` when the set is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
}

impl Defaults {
    pub fn new(effect: impl Into<Effect>, channel: impl Into<Channel>) -> Self {
        Self {
            effect: Some(effect.into()),
            channel: Some(channel.into()),
        }
    }

    pub fn with_effect(effect: impl Into<Effect>) -> Self {
        Self {
            effect: Some(effect.into()),
            channel: None,
        }
    }

    /// The default effect, or `ask` when unset.
    pub fn effect_or_ask(&self) -> Effect {
        self.effect.clone().unwrap_or(Effect::ASK)
    }

    /// The default channel, or `chat` when unset.
    pub fn channel_or_chat(&self) -> Channel {
        self.channel.clone().unwrap_or(Channel::CHAT)
    }
}

/// Descriptive metadata. Stored and reported, never evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_kind() -> String {
    POLICY_SET_KIND.to_string()
}

/// A complete policy document.
///
/// Example:
/// ```yaml
/// apiVersion: agent-policy/v1
/// kind: PolicySet
/// metadata:
///   name: workstation
/// defaults:
///   effect: ask
/// context_fallbacks:
///   scheduler: background
/// policies:
///   - id: deny-bg-bash
///     effect: deny
///     condition:
///       modes: [background]
///       tools: [bash]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    /// Informational only.
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,

    /// Always `PolicySet`; loaders reject anything else before this type is built.
    #[serde(default = "default_kind")]
    pub kind: String,

    pub metadata: Metadata,

    #[serde(default)]
    pub defaults: Defaults,

    /// Declaration order. Engines re-sort by priority at load time.
    #[serde(default)]
    pub policies: Vec<Policy>,

    /// Mode to retry with when nothing matches the current mode.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context_fallbacks: BTreeMap<String, String>,
}

impl PolicySet {
    /// An empty set named `name` with unset defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: Metadata::new(name),
            defaults: Defaults::default(),
            policies: Vec::new(),
            context_fallbacks: BTreeMap::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn with_fallback(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.context_fallbacks.insert(from.into(), to.into());
        self
    }
}
