use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::reporting::summary::Tier;

pub const BASE_URL_ENV: &str = "FMC_API_BASE_URL";
pub const TOKEN_ENV: &str = "FMC_API_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
    pub slider: SliderConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub token_cache: PathBuf,
    pub timeout_seconds: u64,
    /// Only ever set from the environment, never written to disk.
    #[serde(skip)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SliderConfig {
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub tiers: Vec<Tier>,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Wrote default config to {}", config_path.display());
            Ok(config)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fmc-portal")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `FMC_API_BASE_URL` and `FMC_API_TOKEN` as resolved by `lookup`.
    /// Blank values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = present(BASE_URL_ENV) {
            self.api.base_url = base_url;
        }
        if let Some(token) = present(TOKEN_ENV) {
            self.api.token = Some(token);
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = Self::config_dir();
        let output_dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                token_cache: config_dir.join("token.json"),
                timeout_seconds: 30,
                token: None,
            },
            slider: SliderConfig {
                interval_seconds: 5,
            },
            report: ReportConfig {
                output_dir,
                tiers: vec![
                    Tier::labelled("silver", "Silver"),
                    Tier::labelled("gold", "Gold"),
                    Tier::labelled("gold_plus", "Gold+"),
                    Tier::labelled("platinum", "Platinum"),
                ],
            },
        }
    }
}
