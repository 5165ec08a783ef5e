//! Domain event system: decoupled observation of chat turns.
//!
//! The orchestrator publishes an event at each interesting point of a turn.
//! Subscribers (the CLI's verbose mode, tests) react without the orchestrator
//! knowing they exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A visitor message started a new turn
    TurnStarted {
        conversation_id: String,
        content_preview: String,
        timestamp: DateTime<Utc>,
    },

    /// The model produced a final reply
    ResponseGenerated {
        conversation_id: String,
        model: String,
        rounds: usize,
        tokens_used: u32,
        timestamp: DateTime<Utc>,
    },

    /// A tool was executed
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The turn hit the round cap without a final reply
    RoundLimitReached {
        conversation_id: String,
        max_rounds: usize,
        timestamp: DateTime<Utc>,
    },

    /// The backend failed and the turn was rolled back
    TurnFailed {
        conversation_id: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
