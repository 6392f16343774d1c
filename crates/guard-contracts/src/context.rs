//! The evaluation context: runtime facts about one attempted action.

use serde::{Deserialize, Serialize};

/// Snapshot of runtime state for a single tool invocation.
///
/// Every field is independently optional. `None` means the fact is unknown,
/// which is distinct from `Some("")`; the MCP-server dimension relies on
/// that distinction (see `Condition`).
///
/// Contexts are built fresh for each evaluation call:
///
/// ```rust,ignore
/// let ctx = EvaluationContext::new()
///     .with_tool("bash")
///     .with_mode("background");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Execution mode of the agent (e.g. "interactive", "background").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Model driving the agent (e.g. "gpt-5.2", "claude-sonnet-4.6").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Channel the request arrived on. Unrelated to the verdict channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Tool being invoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// MCP server providing the tool, when the tool is an MCP tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server: Option<String>,
    /// Risk level assigned by the host (e.g. "low", "high").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl EvaluationContext {
    /// An empty context: every fact unknown.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_mcp_server(mut self, mcp_server: impl Into<String>) -> Self {
        self.mcp_server = Some(mcp_server.into());
        self
    }

    pub fn with_risk(mut self, risk: impl Into<String>) -> Self {
        self.risk = Some(risk.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Return a copy of this context with only the mode replaced.
    ///
    /// Used by the fallback walk; every other fact is carried through.
    pub fn with_mode_replaced(&self, mode: &str) -> Self {
        Self {
            mode: Some(mode.to_string()),
            ..self.clone()
        }
    }

    /// The mode as a lookup key. An unknown mode is the empty string.
    pub fn mode_key(&self) -> &str {
        self.mode.as_deref().unwrap_or("")
    }
}
