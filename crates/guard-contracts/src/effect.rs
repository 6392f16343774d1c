//! Open string types for policy effects and approval channels.
//!
//! Both types behave like enumerations with an open value set: a handful of
//! well-known values are provided as associated constants, but any string is
//! a legal value and is carried through evaluation verbatim. The engine only
//! ever compares them for equality.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What should happen to a tool invocation when a policy matches.
///
/// Custom strategies are expressed by constructing an `Effect` from any
/// string, e.g. `Effect::new("my-org-mfa")`.
///
/// ```rust,ignore
/// assert_eq!(Effect::new("hitl"), Effect::HITL);
/// assert_ne!(Effect::ASK, Effect::HITL); // no alias folding
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Effect(Cow<'static, str>);

impl Effect {
    pub const ALLOW: Effect = Effect(Cow::Borrowed("allow"));
    pub const DENY: Effect = Effect(Cow::Borrowed("deny"));
    pub const ASK: Effect = Effect(Cow::Borrowed("ask"));
    /// Human in the loop.
    pub const HITL: Effect = Effect(Cow::Borrowed("hitl"));
    /// Phone in the loop.
    pub const PITL: Effect = Effect(Cow::Borrowed("pitl"));
    /// Agent in the loop.
    pub const AITL: Effect = Effect(Cow::Borrowed("aitl"));
    pub const FILTER: Effect = Effect(Cow::Borrowed("filter"));

    /// Construct an effect from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0.into_owned()
    }
}

impl Default for Effect {
    fn default() -> Self {
        Self::ASK
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Effect {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Effect {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for Effect {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Effect {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// How a human should be reached when an effect requires approval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(Cow<'static, str>);

impl Channel {
    pub const CHAT: Channel = Channel(Cow::Borrowed("chat"));
    pub const PHONE: Channel = Channel(Cow::Borrowed("phone"));

    /// Construct a channel from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0.into_owned()
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::CHAT
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Channel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Channel {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for Channel {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Channel {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
