//! Configuration loading, validation, and management for inkmath.
//!
//! Loads configuration from `~/.inkmath/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! `AppConfig` is constructed once and passed explicitly into the gateway
//! and the provider builder — there is no process-wide implicit singleton.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.inkmath/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generator API key (also settable via `INKMATH_API_KEY` or
    /// `GEMINI_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Generator configuration
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("generator", &self.generator)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Model name sent to the upstream API
    #[serde(default = "default_model")]
    pub model: String,

    /// Override the API base URL (e.g., for testing or proxies)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Upstream request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed by CORS. The drawing frontend runs on a different
    /// origin, so this defaults to `["*"]` (allow any).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    8900
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.inkmath/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `INKMATH_API_KEY` (highest priority)
    /// - `GEMINI_API_KEY`
    ///
    /// and `INKMATH_MODEL` for the model name.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("INKMATH_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("INKMATH_MODEL") {
            config.generator.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".inkmath")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generator.model must not be empty".into(),
            ));
        }

        if self.generator.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "generator.timeout_secs must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            generator: GeneratorConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
