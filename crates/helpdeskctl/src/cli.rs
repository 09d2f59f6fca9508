//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Helpdesk console
#[derive(Parser, Debug)]
#[command(name = "helpdeskctl")]
#[command(about = "Helpdesk FAQ responder - console front-end", long_about = None)]
#[command(version = env!("HELPDESK_VERSION"))]
pub struct Cli {
    /// Config file (overrides $HELPDESK_CONFIG and /etc/helpdesk/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Knowledge base CSV (overrides the configured path)
    #[arg(long, global = true)]
    pub kb: Option<PathBuf>,

    /// Subcommand (if not provided, starts an interactive chat)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive support conversation
    Chat {
        /// Do not archive the conversation on exit
        #[arg(long)]
        no_save: bool,
    },

    /// Show how a single message would be answered
    Lookup {
        /// Message text, as a customer would type it
        text: String,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Load the knowledge base and report keys and warnings
    Check,
}
