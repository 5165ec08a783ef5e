//! Tool trait and registry: the side-effecting actions the model can request.
//!
//! The registry is a fixed mapping from tool name to a typed handler. Its
//! [`ToolRegistry::dispatch`] never fails: unknown names, unparseable
//! arguments and validation errors all come back as a failed [`ToolResult`]
//! that is fed to the model as ordinary tool-message content.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use crate::error::ToolError;
use crate::message::MessageToolCall;
use crate::provider::ToolDefinition;

/// A parsed request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the model's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Parse the serialized argument payload of a wire tool call.
    ///
    /// An empty payload is read as `{}`.
    pub fn parse(call: &MessageToolCall) -> Result<Self, ToolError> {
        let raw = call.arguments.trim();
        let arguments = if raw.is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments(e.to_string()))?
        };

        Ok(Self {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments,
        })
    }
}

/// The outcome of a tool call, as reported back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool did what was asked
    pub ok: bool,

    /// Structured result or error description
    pub payload: serde_json::Value,
}

impl ToolResult {
    /// A successful result with the given payload.
    pub fn success(payload: serde_json::Value) -> Self {
        Self { ok: true, payload }
    }

    /// The standard `{recorded: true}` success.
    pub fn recorded() -> Self {
        Self::success(serde_json::json!({ "recorded": true }))
    }

    /// A failed result carrying `{error: <code>}`.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            payload: serde_json::json!({ "error": error.into() }),
        }
    }

    /// Convert a tool error into the failure shape the model sees.
    pub fn from_error(err: &ToolError) -> Self {
        let mut result = Self::failure(err.code());
        if let ToolError::InvalidArguments(detail) = err {
            result.payload["detail"] = serde_json::Value::String(detail.clone());
        }
        result
    }

    /// The error code of a failed result.
    pub fn error(&self) -> Option<&str> {
        self.payload["error"].as_str()
    }

    /// Serialize for use as `tool` message content.
    pub fn to_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"ok":false}"#.to_string())
    }
}

/// Deserialize a tool's argument record from a JSON value.
pub fn parse_arguments<T: DeserializeOwned>(arguments: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// The core Tool trait.
///
/// Handlers must be `Send + Sync`: one registry is shared by every session.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "record_user_details").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools, keyed by name.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Execute a parsed tool call.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        tool.execute(call.arguments.clone()).await
    }

    /// Execute a wire tool call, folding every failure into a failed result.
    pub async fn dispatch(&self, call: &MessageToolCall) -> ToolResult {
        let outcome = match ToolCall::parse(call) {
            Ok(parsed) => self.execute(&parsed).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => result,
            Err(e) => {
                debug!(tool = %call.name, call_id = %call.id, error = %e, "Tool call rejected");
                ToolResult::from_error(&e)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
