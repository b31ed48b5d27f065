//! Configuration management for filebot.toml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file searched for on startup
pub const CONFIG_FILE_NAME: &str = "filebot.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub agent: AgentSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    /// No timeout when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub num_ctx: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Directory the file tools operate on
    #[serde(default = "default_files_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    /// Rounds in which the tool catalog is attached
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    /// Evict old exchanges once the history exceeds this many characters
    #[serde(default)]
    pub context_budget_chars: Option<usize>,
    /// Forget sessions that have not been used for this many seconds
    #[serde(default)]
    pub session_idle_secs: Option<u64>,
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
    /// Used when the inbound query is empty
    #[serde(default = "default_query")]
    pub default_query: String,
}

fn default_model_name() -> String {
    "gpt-oss:20b".to_string()
}

fn default_files_dir() -> PathBuf {
    PathBuf::from("Files")
}

fn default_max_tool_rounds() -> usize {
    1
}

fn default_max_reply_chars() -> usize {
    2000
}

fn default_query() -> String {
    "Hello".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            temperature: None,
            num_ctx: None,
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            dir: default_files_dir(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            context_budget_chars: None,
            session_idle_secs: None,
            max_reply_chars: default_max_reply_chars(),
            default_query: default_query(),
        }
    }
}

impl Config {
    /// Load configuration from filebot.toml
    pub fn load() -> Result<Self> {
        Self::load_from(Self::find_config_path()?)
    }

    /// Try to load configuration, returning None if not found
    pub fn try_load() -> Option<Self> {
        Self::load().ok()
    }

    /// Create a minimal default configuration for when filebot.toml is missing
    pub fn default_minimal() -> Self {
        Self {
            ollama: OllamaConfig {
                host: "127.0.0.1".to_string(),
                port: 11434,
                request_timeout_secs: None,
            },
            model: ModelConfig::default(),
            files: FilesConfig::default(),
            agent: AgentSettings::default(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.as_ref().display()))
    }

    /// Find filebot.toml in the current directory, its parents, then the user config dir
    pub fn find_config_path() -> Result<PathBuf> {
        let mut current = std::env::current_dir()?;

        for _ in 0..10 {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Ok(candidate);
            }
            if !current.pop() {
                break;
            }
        }

        if let Some(candidate) = Self::user_config_path().filter(|p| p.exists()) {
            return Ok(candidate);
        }

        anyhow::bail!("{} not found in current directory or parents", CONFIG_FILE_NAME)
    }

    /// ~/.config/filebot/filebot.toml (or platform equivalent)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("filebot").join(CONFIG_FILE_NAME))
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.ollama.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn session_idle(&self) -> Option<Duration> {
        self.agent.session_idle_secs.map(Duration::from_secs)
    }
}
