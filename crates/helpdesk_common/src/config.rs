//! Configuration for the helpdesk daemon and CLI.
//!
//! Loads `$HELPDESK_CONFIG`, then /etc/helpdesk/config.toml, or uses defaults.
//! Every field has a serde default so partial files are fine.

use crate::error::HelpdeskError;
use crate::matcher::DEFAULT_CUTOFF;
use crate::store::DEFAULT_CONVERSATION_DIR;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// System config file path
pub const CONFIG_PATH: &str = "/etc/helpdesk/config.toml";

/// Environment override for the config file path
pub const CONFIG_ENV: &str = "HELPDESK_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// CSV file with Pregunta/Respuesta/Sinonimos columns
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("preguntas_respuestas.csv")
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum similarity for an approximate answer (0.0-1.0)
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,
}

fn default_cutoff() -> f64 {
    DEFAULT_CUTOFF
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationsConfig {
    /// Directory for archived conversations
    #[serde(default = "default_conversation_dir")]
    pub dir: PathBuf,
}

fn default_conversation_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CONVERSATION_DIR)
}

impl Default for ConversationsConfig {
    fn default() -> Self {
        Self {
            dir: default_conversation_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Name the assistant introduces itself with
    #[serde(default = "default_bot_name")]
    pub name: String,
}

fn default_bot_name() -> String {
    "Juan".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the chat relay
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Seconds before an unfinished conversation is forgotten
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_session_idle_secs() -> u64 {
    1800
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(default)]
    pub matcher: MatcherConfig,

    #[serde(default)]
    pub conversations: ConversationsConfig,

    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load from `explicit`, `$HELPDESK_CONFIG` or the system path, else defaults.
    ///
    /// An explicitly requested file that fails to load is an error; the
    /// implicit locations fall back to defaults with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, HelpdeskError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let candidate = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));

        Ok(Self::load_from_path(&candidate).unwrap_or_else(|e| {
            warn!("Config not loaded ({}), using defaults", e);
            Config::default()
        }))
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, HelpdeskError> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, HelpdeskError> {
        let config: Config =
            toml::from_str(content).map_err(|e| HelpdeskError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), HelpdeskError> {
        if !(0.0..=1.0).contains(&self.matcher.cutoff) {
            return Err(HelpdeskError::Config(format!(
                "matcher.cutoff must be within 0.0..=1.0, got {}",
                self.matcher.cutoff
            )));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, HelpdeskError> {
        toml::to_string_pretty(self).map_err(|e| HelpdeskError::Config(e.to_string()))
    }
}
