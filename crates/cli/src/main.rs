//! Folio CLI: the main entry point.
//!
//! Commands:
//! - `chat`   : Interactive terminal conversation with the persona
//! - `ask`    : Send one message and print the reply
//! - `serve`  : Start the HTTP chat transport
//! - `prompt` : Print the assembled system prompt
//! - `doctor` : Diagnose configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio: a portfolio chatbot that answers as you and captures leads",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.folio/config.toml)
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the persona in the terminal
    Chat,

    /// Send a single message and print the reply
    Ask {
        /// The visitor's message
        message: String,
    },

    /// Start the HTTP chat server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the system prompt built from the knowledge files
    Prompt,

    /// Diagnose configuration and knowledge sources
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A local .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Chat => commands::chat::run(config_path).await?,
        Commands::Ask { message } => commands::ask::run(config_path, &message).await?,
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Prompt => commands::prompt::run(config_path)?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
