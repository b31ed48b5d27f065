//! Non-interactive commands

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use filebot::transport::{clip_reply, strip_mentions};
use filebot::{create_default_registry, AgentConfig, AgentLoop, FileStore, DEFAULT_SESSION};
use llm_core::{Config, OllamaClient, OllamaStatus};
use tracing::{info, warn};

// ANSI colors
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Load the explicit config path, else search for filebot.toml, else use defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::load_from(path);
    }

    match Config::try_load() {
        Some(config) => Ok(config),
        None => {
            warn!("filebot.toml not found, using defaults (localhost:11434)");
            Ok(Config::default_minimal())
        }
    }
}

pub fn client(config: &Config) -> OllamaClient {
    OllamaClient::with_timeout(config.ollama_url(), config.request_timeout())
}

/// Wire the Ollama client, the file tools and the agent together
pub fn build_agent(config: &Config, model: Option<String>) -> AgentLoop {
    let mut agent_config = AgentConfig::from_config(config);
    if let Some(model) = model {
        agent_config.model = model;
    }

    let store = FileStore::new(&config.files.dir);
    info!(dir = %store.dir().display(), "Serving files");

    AgentLoop::new(
        Arc::new(client(config)),
        create_default_registry(store),
        agent_config,
    )
}

/// Inbound message → agent → outbound reply, the way a chat transport would
pub async fn reply_to(agent: &AgentLoop, config: &Config, message: &str) -> String {
    let query = strip_mentions(message);
    let reply = agent.handle_turn(DEFAULT_SESSION, &query).await;
    clip_reply(&reply, config.agent.max_reply_chars).to_string()
}

pub async fn ask(config: Config, model: Option<String>, prompt: &str) -> Result<()> {
    let agent = build_agent(&config, model);
    let reply = reply_to(&agent, &config, prompt).await;
    println!("{}", reply);
    Ok(())
}

pub fn files(config: &Config) -> Result<()> {
    let store = FileStore::new(&config.files.dir);
    let names = store
        .list_entries()
        .with_context(|| format!("Failed to list {}", store.dir().display()))?;

    println!("{}Files in {}{}", BOLD, store.dir().display(), RESET);
    if names.is_empty() {
        println!("  {}No files{}", YELLOW, RESET);
    }
    for (index, name) in names.iter().enumerate() {
        println!("  {}. {}", index + 1, name);
    }
    Ok(())
}

pub async fn status(config: &Config) -> Result<()> {
    let client = client(config);

    println!("{}Ollama Status{}", BOLD, RESET);
    println!("  Endpoint: {}", client.base_url());

    match client.status().await {
        OllamaStatus::Running => print_status(true, "Ollama is running"),
        OllamaStatus::Stopped => {
            print_status(false, "Ollama is not running");
            return Ok(());
        }
    }

    let models = client.list_models().await?;
    println!("\n{}Models ({}){}", BOLD, models.len(), RESET);
    let mut sorted = models;
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    for m in sorted {
        let marker = if m.name == config.model.name { " (configured)" } else { "" };
        println!("  - {} ({}){}", m.name, m.size_human(), marker);
    }
    Ok(())
}

fn print_status(ok: bool, message: &str) {
    if ok {
        println!("  {}✓{} {}", GREEN, RESET, message);
    } else {
        println!("  {}✗{} {}", RED, RESET, message);
    }
}
