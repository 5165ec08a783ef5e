//! `folio serve`: start the HTTP chat transport.

use folio_core::event::EventBus;
use std::path::Path;
use std::sync::Arc;

pub async fn run(config_path: Option<&Path>, port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let event_bus = Arc::new(EventBus::default());
    let _logger = super::spawn_event_logger(&event_bus);
    let agent = Arc::new(super::build_agent(&config, event_bus)?);

    println!("Folio Gateway");
    println!("   Persona:   {}", config.persona.name);
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);

    folio_gateway::start(&config, agent).await?;

    Ok(())
}
