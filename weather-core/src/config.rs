use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

/// Environment variable holding the OpenWeatherMap API key.
pub const API_KEY_ENV: &str = "OWM_KEY";

/// Environment variable overriding the provider base URL (mainly for tests).
pub const BASE_URL_ENV: &str = "OWM_BASE_URL";

/// Default OpenWeatherMap API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Process configuration for the weather service.
///
/// An absent API key is legal here; it surfaces as
/// [`crate::FetchError::ApiKeyMissing`] on the first upstream fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeatherMap API key.
    pub api_key: Option<String>,

    /// API root the client prepends to `/weather` and `/forecast`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self { api_key: None, base_url: default_base_url() }
    }
}

impl Config {
    /// Build a config from the process environment alone.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var(API_KEY_ENV).ok(),
            base_url: env::var(BASE_URL_ENV).ok().unwrap_or_else(default_base_url),
        }
    }

    /// Load config from a TOML file, then overlay the environment on top.
    ///
    /// The environment always wins, so a deployed key never has to be written
    /// to disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Ok(key) = env::var(API_KEY_ENV) {
            cfg.api_key = Some(key);
        }
        if let Ok(url) = env::var(BASE_URL_ENV) {
            cfg.base_url = url;
        }

        Ok(cfg)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
