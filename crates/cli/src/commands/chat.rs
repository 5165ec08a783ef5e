//! `folio chat`: interactive terminal conversation.

use folio_core::event::EventBus;
use folio_core::message::Message;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let event_bus = Arc::new(EventBus::default());
    let _logger = super::spawn_event_logger(&event_bus);
    let agent = super::build_agent(&config, event_bus)?;

    println!();
    println!("  {}", agent.persona().name);
    println!("  {}", config.persona.description);
    println!();
    println!("  Model:     {}", config.provider.model);
    println!("  Knowledge: {} files loaded (~{} tokens)",
        agent.persona().loaded_files.len(),
        agent.persona().estimated_tokens()
    );
    if !config.persona.examples.is_empty() {
        println!("  Try:");
        for example in &config.persona.examples {
            println!("    - {example}");
        }
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history: Vec<Message> = Vec::new();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        // A failed turn hands back the prior history without this message.
        eprint!("  ...");
        let (outcome, updated) = agent.respond(input, std::mem::take(&mut history)).await;
        history = updated;
        eprint!("\r     \r");

        println!();
        for line in outcome.reply.lines() {
            println!("  {} > {line}", agent.persona().name);
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
