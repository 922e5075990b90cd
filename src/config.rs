//! Configuration
//!
//! Loaded from `~/.kbassist/config.toml`, created with defaults on first
//! run. Every field has a serde default so partial files stay valid.

use crate::errors::{ChatError, Result};
use crate::retrieval::SearchMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Location of the scraped KB document
    #[serde(default = "default_kb_url")]
    pub kb_url: String,

    /// Answer-generation endpoint
    #[serde(default = "default_answer_endpoint")]
    pub answer_endpoint: String,

    /// Backing store base URL (vector mode only)
    #[serde(default)]
    pub supabase_url: String,

    /// Backing store publishable key (vector mode only)
    #[serde(default)]
    pub supabase_key: String,

    /// Which search backend retrieval uses
    #[serde(default)]
    pub search_mode: SearchMode,

    /// Minimum cosine similarity for vector matches; low on purpose to
    /// cast a wide net before local truncation
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,

    /// Result cap for retrieval
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Sampling temperature sent to the answer endpoint
    #[serde(default)]
    pub temperature: f32,

    /// Assistant persona. Product copy, not part of the retrieval or
    /// streaming contract; override freely.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_kb_url() -> String {
    "http://127.0.0.1:8788/kb-data.json".to_string()
}

fn default_answer_endpoint() -> String {
    "http://127.0.0.1:8788/api/chat".to_string()
}

fn default_match_threshold() -> f32 {
    0.1
}

fn default_max_results() -> usize {
    10
}

fn default_system_prompt() -> String {
    "You are the CounterGo support assistant - product specialist for CounterGo, Systemize, and Inventory.

CORE RULES:
- Use ONLY the knowledge base articles provided in the user message
- NO numbered lists, NO headers, NO tutorial format
- 2-4 sentences maximum unless complexity requires more
- If the knowledge base does not cover it, say so and point the user to support
- Compressed prose only

Answer with KB-backed specificity and compressed clarity."
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kb_url: default_kb_url(),
            answer_endpoint: default_answer_endpoint(),
            supabase_url: String::new(),
            supabase_key: String::new(),
            search_mode: SearchMode::default(),
            match_threshold: default_match_threshold(),
            max_results: default_max_results(),
            temperature: 0.0,
            system_prompt: default_system_prompt(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating it if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ChatError::Config(format!("failed to read {}: {e}", path.display()))
        })?;

        toml::from_str(&contents)
            .map_err(|e| ChatError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ChatError::Config(format!("failed to serialize config: {e}")))?;

        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    /// Default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ChatError::Config("could not determine home directory".to_string()))?;

        Ok(home.join(".kbassist").join("config.toml"))
    }
}
