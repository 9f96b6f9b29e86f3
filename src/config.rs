//! Configuration handling for the lms-search CLI
//!
//! Reads the optional `lms-search.toml` file from the config directory.
//!
//! ## Environment Variables
//!
//! The following environment variables override config file settings:
//!
//! - `LMS_SEARCH_CACHE_CAPACITY` - Compiled-query cache size (0 disables caching)
//! - `LMS_SEARCH_PRETTY` - Pretty-print JSON output (`true`/`false`)
//! - `LMS_SEARCH_COLOR` - Colored diagnostics (`true`/`false`)
//!
//! These can be set in a `.env` file in the config directory.

use std::path::Path;

use anyhow::Context;
use lmsql_core::EngineConfig;
use serde::{Deserialize, Serialize};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "lms-search.toml";

/// Environment variable names
pub const ENV_CACHE_CAPACITY: &str = "LMS_SEARCH_CACHE_CAPACITY";
pub const ENV_PRETTY: &str = "LMS_SEARCH_PRETTY";
pub const ENV_COLOR: &str = "LMS_SEARCH_COLOR";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Search engine settings
    #[serde(default)]
    pub engine: EngineConfig,
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output-specific configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print matched records as one JSON array
    #[serde(default)]
    pub pretty: bool,
    /// Colorize diagnostics
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            color: default_color(),
        }
    }
}

impl Config {
    /// Load configuration from a directory
    ///
    /// Loads any `.env` file in the directory, reads `lms-search.toml` when
    /// present (defaults otherwise) and applies environment overrides.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        // Load env file if present (ignore errors)
        let env_path = dir.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }

        let config_path = dir.join(CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("Invalid configuration in {}", config_path.display()))?
        } else {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CACHE_CAPACITY) {
            match value.trim().parse::<usize>() {
                Ok(capacity) => self.engine.cache_capacity = capacity,
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", ENV_CACHE_CAPACITY, value),
            }
        }

        if let Some(pretty) = lookup(ENV_PRETTY).as_deref().and_then(parse_flag) {
            self.output.pretty = pretty;
        }

        if let Some(color) = lookup(ENV_COLOR).as_deref().and_then(parse_flag) {
            self.output.color = color;
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
