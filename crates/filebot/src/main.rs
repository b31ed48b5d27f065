//! filebot: answer questions about a folder of files with a local LLM
//!
//! The chat platform's gateway is not part of this binary; the REPL and the
//! `ask` command stand in for it and feed plain-text queries to the agent.

mod commands;
mod repl;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "filebot")]
#[command(about = "Chat assistant for a folder of files, backed by Ollama", version)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to filebot.toml (searched for when omitted)
    #[arg(short, long, global = true, env = "FILEBOT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start interactive chat REPL
    Chat {
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// One-shot query (non-interactive)
    Ask {
        /// The message to send; mention tokens are stripped
        prompt: Vec<String>,

        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the files the assistant can read
    Files,

    /// Show Ollama status and available models
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Chat { model }) => repl::run(config, model).await,
        Some(Commands::Ask { prompt, model }) => {
            commands::ask(config, model, &prompt.join(" ")).await
        }
        Some(Commands::Files) => commands::files(&config),
        Some(Commands::Status) => commands::status(&config).await,
        None => {
            // Default to chat REPL when no command specified
            repl::run(config, None).await
        }
    }
}
