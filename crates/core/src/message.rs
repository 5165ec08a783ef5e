//! Message and Conversation domain types.
//!
//! These are the value objects that flow through the whole system:
//! a visitor sends a message → the transport appends it to the session
//! history → the orchestrator drives the model → the reply is appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The visitor
    User,
    /// The persona
    Assistant,
    /// System instructions (persona, knowledge, tool rules)
    System,
    /// Tool execution result
    Tool,
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// A single message in a conversation.
///
/// `content` is `None` only on an assistant message that carries tool calls
/// and no text. A `Tool` message always has `tool_call_id` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    #[serde(default = "new_message_id")]
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    #[serde(default)]
    pub content: Option<String>,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: Option<String>) -> Self {
        Self {
            id: new_message_id(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, Some(content.into()))
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, Some(content.into()))
    }

    /// Create an assistant message that requests tool calls.
    ///
    /// Empty text is normalized to `None`.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<MessageToolCall>) -> Self {
        let content = content.filter(|c| !c.is_empty());
        Self {
            tool_calls,
            ..Self::with_role(Role::Assistant, content)
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, Some(content.into()))
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role(Role::Tool, Some(content.into()))
        }
    }

    /// The text content, or `""` when there is none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Whether this message asks for tool execution.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A tool call embedded in an assistant message, as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON string
    pub arguments: String,
}

/// A conversation is an ordered sequence of messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a conversation seeded with existing messages.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::new()
        }
    }

    /// Add a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    /// Messages other than system instructions, i.e. what a visitor sees.
    pub fn visible_messages(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect()
    }
}

/// Keep only the messages of a transport-supplied history that a backend
/// will accept.
///
/// Dropped: system messages, user or assistant messages without text, and
/// tool results that do not answer the tool calls of the assistant message
/// directly before them. An assistant message whose tool calls are not all
/// answered is dropped together with its partial results.
pub fn sanitize_history(messages: Vec<Message>) -> Vec<Message> {
    let mut kept = Vec::with_capacity(messages.len());
    let mut iter = messages.into_iter().peekable();

    while let Some(message) = iter.next() {
        match message.role {
            Role::System | Role::Tool => {}
            Role::User => {
                if !message.text().is_empty() {
                    kept.push(message);
                }
            }
            Role::Assistant if message.has_tool_calls() => {
                let mut answered: Vec<Message> = Vec::new();
                while let Some(result) = iter.next_if(|m| m.role == Role::Tool) {
                    let answers_call = match result.tool_call_id.as_deref() {
                        Some(id) => {
                            message.tool_calls.iter().any(|c| c.id == id)
                                && !answered.iter().any(|m| m.tool_call_id.as_deref() == Some(id))
                        }
                        None => false,
                    };
                    if answers_call {
                        answered.push(result);
                    }
                }
                if answered.len() == message.tool_calls.len() {
                    kept.push(message);
                    kept.extend(answered);
                }
            }
            Role::Assistant => {
                if !message.text().is_empty() {
                    kept.push(message);
                }
            }
        }
    }

    kept
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
