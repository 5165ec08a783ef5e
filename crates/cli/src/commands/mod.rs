//! Subcommand implementations and the wiring they share.

pub mod ask;
pub mod chat;
pub mod doctor;
pub mod prompt;
pub mod serve;

use folio_agent::AgentLoop;
use folio_config::AppConfig;
use folio_core::event::{DomainEvent, EventBus};
use folio_core::knowledge::KnowledgeBase;
use folio_core::persona::Persona;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Resolve the config file path.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load config from `explicit` or the default path, with env overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = config_path(explicit);
    AppConfig::load_with_overrides(&path)
        .map_err(|e| format!("Failed to load config: {e}").into())
}

/// Read the knowledge files and build the persona.
pub fn load_persona(config: &AppConfig) -> Persona {
    let knowledge = KnowledgeBase::load(&config.persona.knowledge_sources());
    if knowledge.is_empty() {
        tracing::warn!("No knowledge loaded; the persona can only redirect questions");
    }
    Persona::new(&config.persona.name, &knowledge)
}

/// Build everything a conversation needs. Fails fast without an API key.
pub fn build_agent(
    config: &AppConfig,
    event_bus: Arc<EventBus>,
) -> Result<AgentLoop, Box<dyn std::error::Error>> {
    config.require_api_key()?;

    let provider = folio_providers::build_from_config(config)?;
    let notifier = folio_notify::from_config(&config.notifications);
    let tools = Arc::new(folio_tools::persona_registry(notifier));
    let persona = Arc::new(load_persona(config));

    info!(
        persona = %persona.name,
        model = %config.provider.model,
        knowledge_files = persona.loaded_files.len(),
        "Agent ready"
    );

    Ok(AgentLoop::from_config(config, provider, tools, persona, event_bus))
}

/// Log every domain event at debug level until the bus is dropped.
pub fn spawn_event_logger(event_bus: &EventBus) -> tokio::task::JoinHandle<()> {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => log_event(&event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Event logger lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn log_event(event: &DomainEvent) {
    match event {
        DomainEvent::TurnStarted { content_preview, .. } => {
            debug!(preview = %content_preview, "event: turn started")
        }
        DomainEvent::ResponseGenerated { model, rounds, tokens_used, .. } => {
            debug!(%model, rounds, tokens_used, "event: response generated")
        }
        DomainEvent::ToolExecuted { tool_name, success, duration_ms, .. } => {
            debug!(tool = %tool_name, success, duration_ms, "event: tool executed")
        }
        DomainEvent::RoundLimitReached { max_rounds, .. } => {
            debug!(max_rounds, "event: round limit reached")
        }
        DomainEvent::TurnFailed { error_message, .. } => {
            debug!(error = %error_message, "event: turn failed")
        }
    }
}
