//! The agent reasoning loop implementation.

use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use folio_config::AppConfig;
use folio_core::event::{DomainEvent, EventBus};
use folio_core::message::{Conversation, Message, Role, sanitize_history};
use folio_core::persona::Persona;
use folio_core::provider::{Provider, ProviderRequest};
use folio_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

/// Reply shown to the visitor when the model backend fails.
pub const BACKEND_FAILURE_REPLY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// Reply used when the round cap is hit before the model produced text.
pub const ROUND_LIMIT_REPLY: &str =
    "Sorry, I couldn't finish putting that answer together. Could you rephrase or ask me something else?";

/// Reply used when the model finishes with no text at all.
pub const EMPTY_REPLY_FALLBACK: &str =
    "Sorry, I don't have a good answer to that. Is there anything else you'd like to know?";

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// The model produced a final reply
    Replied,
    /// The round cap was hit; the reply is [`ROUND_LIMIT_REPLY`]
    RoundLimit,
    /// A backend call failed; the reply is [`BACKEND_FAILURE_REPLY`]
    BackendFailure,
}

/// The result of one visitor turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Text shown to the visitor. Never empty.
    pub reply: String,
    pub status: TurnStatus,
    /// Model calls made during the turn
    pub rounds: usize,
    /// Tool calls executed during the turn
    pub tool_calls: usize,
    /// Total tokens reported by the backend
    pub tokens_used: u32,
}

/// The conversation orchestrator.
///
/// Stateless across turns: one instance is shared by every session, and each
/// call works on the caller's own [`Conversation`].
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Who the agent speaks as
    persona: Arc<Persona>,

    /// Model calls allowed per turn
    max_rounds: usize,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        persona: Arc<Persona>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            persona,
            max_rounds: 5,
            event_bus,
        }
    }

    /// Create an agent loop with model settings and round cap taken from config.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        persona: Arc<Persona>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let agent = Self::new(
            provider,
            &config.provider.model,
            config.provider.temperature,
            tools,
            persona,
            event_bus,
        )
        .with_max_rounds(config.agent.max_rounds);

        match config.provider.max_tokens {
            Some(max) => agent.with_max_tokens(max),
            None => agent,
        }
    }

    /// Set the maximum number of model calls per turn (at least 1).
    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max.max(1);
        self
    }

    /// Set the max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// The request for the next round: system prompt first, then the history.
    fn build_request(&self, conversation: &Conversation) -> ProviderRequest {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(Message::system(&self.persona.system_prompt));
        messages.extend(
            conversation
                .messages
                .iter()
                .filter(|m| m.role != Role::System)
                .cloned(),
        );

        ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: self.tools.definitions(),
        }
    }

    /// Run one visitor turn.
    ///
    /// `conversation` must already end with the visitor's message. On return
    /// it holds every message of the turn (assistant tool calls, tool results,
    /// the final reply), except after a backend failure, when it is restored
    /// to exactly what was passed in.
    pub async fn run_turn(&self, conversation: &mut Conversation) -> TurnOutcome {
        let start_len = conversation.len();
        let preview: String = conversation
            .messages
            .last()
            .map(|m| m.text().chars().take(80).collect())
            .unwrap_or_default();

        info!(
            conversation_id = %conversation.id,
            messages = start_len,
            "Processing turn"
        );
        self.event_bus.publish(DomainEvent::TurnStarted {
            conversation_id: conversation.id.to_string(),
            content_preview: preview,
            timestamp: Utc::now(),
        });

        let mut outcome = TurnOutcome {
            reply: String::new(),
            status: TurnStatus::Replied,
            rounds: 0,
            tool_calls: 0,
            tokens_used: 0,
        };

        while outcome.rounds < self.max_rounds {
            outcome.rounds += 1;
            debug!(
                conversation_id = %conversation.id,
                round = outcome.rounds,
                "Agent loop round"
            );

            let request = self.build_request(conversation);
            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        conversation_id = %conversation.id,
                        provider = %self.provider.name(),
                        round = outcome.rounds,
                        error = %e,
                        "Model backend failed, turn rolled back"
                    );
                    conversation.truncate(start_len);
                    self.event_bus.publish(DomainEvent::TurnFailed {
                        conversation_id: conversation.id.to_string(),
                        error_message: e.to_string(),
                        timestamp: Utc::now(),
                    });
                    outcome.reply = BACKEND_FAILURE_REPLY.to_string();
                    outcome.status = TurnStatus::BackendFailure;
                    return outcome;
                }
            };

            if let Some(usage) = &response.usage {
                outcome.tokens_used += usage.total_tokens;
            }

            if !response.message.has_tool_calls() {
                let text = response.message.text().trim();
                let reply = if text.is_empty() {
                    debug!(conversation_id = %conversation.id, "Empty model reply, using fallback");
                    EMPTY_REPLY_FALLBACK.to_string()
                } else {
                    text.to_string()
                };

                conversation.push(Message::assistant(reply.clone()));
                self.event_bus.publish(DomainEvent::ResponseGenerated {
                    conversation_id: conversation.id.to_string(),
                    model: response.model,
                    rounds: outcome.rounds,
                    tokens_used: outcome.tokens_used,
                    timestamp: Utc::now(),
                });
                info!(
                    conversation_id = %conversation.id,
                    rounds = outcome.rounds,
                    tool_calls = outcome.tool_calls,
                    "Turn complete"
                );

                outcome.reply = reply;
                return outcome;
            }

            // The assistant message goes in first so every tool result has
            // its matching call before the next model request.
            let tool_calls = response.message.tool_calls.clone();
            debug!(tool_count = tool_calls.len(), "Executing tool calls");
            conversation.push(response.message);

            for call in &tool_calls {
                let started = Instant::now();
                let result = self.tools.dispatch(call).await;
                let duration_ms = started.elapsed().as_millis() as u64;

                if !result.ok {
                    debug!(
                        tool = %call.name,
                        error = result.error().unwrap_or_default(),
                        "Tool call failed, reporting to model"
                    );
                }
                self.event_bus.publish(DomainEvent::ToolExecuted {
                    tool_name: call.name.clone(),
                    success: result.ok,
                    duration_ms,
                    timestamp: Utc::now(),
                });

                conversation.push(Message::tool_result(&call.id, result.to_content()));
                outcome.tool_calls += 1;
            }
        }

        warn!(
            conversation_id = %conversation.id,
            max_rounds = self.max_rounds,
            "Round cap reached without a final reply"
        );
        self.event_bus.publish(DomainEvent::RoundLimitReached {
            conversation_id: conversation.id.to_string(),
            max_rounds: self.max_rounds,
            timestamp: Utc::now(),
        });
        conversation.push(Message::assistant(ROUND_LIMIT_REPLY));

        outcome.reply = ROUND_LIMIT_REPLY.to_string();
        outcome.status = TurnStatus::RoundLimit;
        outcome
    }

    /// The chat-transport boundary: one visitor message against prior history.
    ///
    /// `history` is passed through [`sanitize_history`]: system messages and
    /// anything a backend would reject are discarded, and the persona's own
    /// system prompt is always used. Returns the outcome and the updated
    /// history. After a backend failure the returned history equals the
    /// sanitized prior history.
    pub async fn respond(
        &self,
        message: &str,
        history: Vec<Message>,
    ) -> (TurnOutcome, Vec<Message>) {
        let supplied = history.len();
        let prior = sanitize_history(history);
        let prior_len = prior.len();
        if prior_len < supplied {
            debug!(dropped = supplied - prior_len, "Discarded malformed history messages");
        }

        let mut conversation = Conversation::from_messages(prior);
        conversation.push(Message::user(message));

        let outcome = self.run_turn(&mut conversation).await;
        if outcome.status == TurnStatus::BackendFailure {
            conversation.truncate(prior_len);
        }

        (outcome, conversation.messages)
    }
}
