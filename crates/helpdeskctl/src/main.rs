//! Helpdesk Control - console front-end for the FAQ responder
//!
//! Runs the support conversation in the terminal, or inspects the
//! knowledge base without starting one.

use anyhow::Result;
use clap::Parser;
use helpdesk_common::Config;
use helpdeskctl::cli::{Cli, Commands};
use helpdeskctl::commands;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs on stderr, conversation on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(kb) = cli.kb {
        config.knowledge.path = kb;
    }

    match cli.command.unwrap_or(Commands::Chat { no_save: false }) {
        Commands::Chat { no_save } => commands::chat(&config, no_save).await,
        Commands::Lookup { text, json } => commands::lookup(&config, &text, json).await,
        Commands::Check => commands::check(&config).await,
    }
}
