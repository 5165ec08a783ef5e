//! # Folio Core
//!
//! Domain types, traits, and error definitions for the Folio persona agent.
//! This crate has **no framework dependencies**: it defines the model that
//! the provider, notifier, tool, agent and gateway crates implement against.
//!
//! ## Layout
//!
//! - [`provider::Provider`] abstracts the language-model backend
//! - [`tool::ToolRegistry`] maps tool names to typed handlers
//! - [`notify::Notifier`] delivers best-effort alerts to the persona's owner
//! - [`persona::build_system_prompt`] turns a [`knowledge::KnowledgeBase`] into instructions

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod notify;
pub mod knowledge;
pub mod persona;
pub mod event;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ToolError, NotifyError};
pub use message::{Message, MessageToolCall, Role, Conversation, ConversationId, sanitize_history};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry};
pub use notify::Notifier;
pub use knowledge::{KnowledgeBase, KnowledgeSources};
pub use persona::{Persona, build_system_prompt};
pub use event::{DomainEvent, EventBus};
