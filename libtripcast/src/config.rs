//! Configuration management for Tripcast
//!
//! Non-secret settings come from an optional TOML file resolved XDG-style
//! (overridable with `TRIPCAST_CONFIG`); secrets come from the environment
//! at startup and live in the [`crate::credentials::CredentialStore`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub image_search: ImageSearchConfig,
    #[serde(default)]
    pub textgen: TextGenConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Instance URL (e.g., "https://mastodon.social")
    pub instance: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            instance: "https://mastodon.social".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSearchConfig {
    /// Base URL of the image-search service
    pub base_url: String,
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.unsplash.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGenConfig {
    /// Base URL of the text-generation service
    pub base_url: String,
    /// Completion model to request
    pub model: String,
}

impl Default for TextGenConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo-instruct".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Public static-assets directory; the chart, the backup CSV, and
    /// uploaded media all land here
    pub static_dir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            static_dir: "static".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to the
    /// built-in defaults when no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Expanded static-assets directory
    pub fn static_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.assets.static_dir).to_string())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("TRIPCAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("tripcast").join("config.toml"))
}
