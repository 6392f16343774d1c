//! Evaluation results.

use serde::{Deserialize, Serialize};

use crate::effect::{Channel, Effect};

/// The outcome of evaluating one context against a loaded policy set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Verdict {
    pub effect: Effect,
    pub channel: Channel,
    /// The policy that decided the verdict. `None` when the defaults applied.
    pub policy_id: Option<String>,
}

impl Verdict {
    /// A verdict produced by a matching policy.
    pub fn matched(effect: Effect, channel: Channel, policy_id: impl Into<String>) -> Self {
        Self {
            effect,
            channel,
            policy_id: Some(policy_id.into()),
        }
    }

    /// A verdict built from the set's defaults.
    pub fn from_defaults(effect: Effect, channel: Channel) -> Self {
        Self {
            effect,
            channel,
            policy_id: None,
        }
    }

    /// True when no policy matched and the defaults were used.
    pub fn is_default(&self) -> bool {
        self.policy_id.is_none()
    }
}

/// Per-policy diagnostic row produced by `evaluate_all`.
///
/// `matched` is the AND of `enabled` and the condition check, so a disabled
/// policy always reports `matched: false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMatch {
    pub policy_id: String,
    pub name: Option<String>,
    pub priority: i32,
    pub effect: Effect,
    pub matched: bool,
    pub enabled: bool,
}
