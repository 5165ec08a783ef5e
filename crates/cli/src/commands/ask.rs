//! `folio ask`: one visitor message, one reply.

use folio_core::event::EventBus;
use folio_core::message::{Conversation, Message};
use std::path::Path;
use std::sync::Arc;

pub async fn run(config_path: Option<&Path>, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let event_bus = Arc::new(EventBus::default());
    let _logger = super::spawn_event_logger(&event_bus);
    let agent = super::build_agent(&config, event_bus)?;

    let mut conv = Conversation::new();
    conv.push(Message::user(message));

    eprint!("  Thinking...");
    let outcome = agent.run_turn(&mut conv).await;
    eprint!("\r              \r");
    println!("{}", outcome.reply);

    Ok(())
}
