//! Configuration loading and management for dischargen.
//!
//! Loads settings from `dischargen.toml`, falling back to built-in defaults.
//! The API key is resolved in layers: the deployment secrets file first, then
//! the environment (which may itself be seeded from a local `.env`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the API key in both the secrets file and the environment.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

const CONFIG_FILE: &str = "dischargen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing API key: set GROQ_API_KEY in the secrets file, the environment or .env")]
    MissingApiKey,
}

/// Generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Provider label, used in log output only
    pub provider: String,
    /// OpenAI-compatible chat completions URL
    pub endpoint: String,
    /// Model identifier (e.g., "llama-3.1-70b-versatile")
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    /// Give up on a request after this many seconds
    pub timeout_secs: u64,
}

/// API key sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Deployment secrets file holding `GROQ_API_KEY = "..."`
    pub secrets_file: PathBuf,
    #[serde(skip)]
    pub groq_key: Option<String>,
}

/// Patient dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub patients: PathBuf,
}

/// Optional header/footer images
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub dir: PathBuf,
}

/// Where rendered documents are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

/// Letterhead printed at the top of every summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    pub name: String,
    pub address: String,
    pub contact: String,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub api: ApiConfig,
    pub data: DataConfig,
    pub assets: AssetsConfig,
    pub output: OutputConfig,
    pub organization: OrganizationConfig,
}

#[derive(Debug, Deserialize)]
struct Secrets {
    #[serde(rename = "GROQ_API_KEY")]
    groq_api_key: Option<String>,
}

impl Config {
    /// Load configuration from the default location (dischargen.toml in cwd or home)
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config file found, using defaults");
                let mut config = Config::default();
                config.resolve_api_key();
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded config");
        config.resolve_api_key();
        Ok(config)
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home_config = dirs::home_dir()?
            .join(".config")
            .join("dischargen")
            .join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }

    /// Secrets file first, environment second. Blank values count as absent.
    fn resolve_api_key(&mut self) {
        let from_secrets = std::fs::read_to_string(&self.api.secrets_file)
            .ok()
            .and_then(|content| toml::from_str::<Secrets>(&content).ok())
            .and_then(|secrets| secrets.groq_api_key);
        let from_env = || std::env::var(API_KEY_VAR).ok();

        self.api.groq_key = from_secrets
            .filter(|key| !key.trim().is_empty())
            .or_else(|| from_env().filter(|key| !key.trim().is_empty()));
    }

    /// Get the API key for the generation service
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api.groq_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.1-70b-versatile".to_string(),
            temperature: 0.4,
            max_tokens: 1024,
            top_p: 1.0,
            timeout_secs: 120,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            secrets_file: PathBuf::from(".dischargen").join("secrets.toml"),
            groq_key: None,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            patients: PathBuf::from("patients_data.json"),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            name: "S+ Care Hospital".to_string(),
            address: "Beside Amir Bank, Opp Mongolia Society, Newtown, Kolkata - 700135"
                .to_string(),
            contact: "Mobile: 70010 00000  Telephone: 90600 00000".to_string(),
        }
    }
}
