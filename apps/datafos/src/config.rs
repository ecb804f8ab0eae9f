//! Application configuration.
//!
//! Layers, lowest to highest precedence: built-in defaults, an optional
//! `datafos.toml` (or the file passed explicitly), and `DATAFOS__*`
//! environment variables (`DATAFOS__DATABASE__URL`, `DATAFOS__SEARCH__MAX_PER_PAGE`, ...).
//! A `.env` file is read first when present.

use std::path::Path;

use datafos_fields::OptionLabels;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub search: SearchConfig,
    /// Locale used to pick option labels.
    pub locale: String,
    /// Translated option labels: `field name -> option -> locale -> label`.
    pub labels: OptionLabels,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// `daily`, `hourly`, `minutely` or `never`.
    pub file_rotation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            search: SearchConfig::default(),
            locale: "en".to_string(),
            labels: OptionLabels::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://datafos.db".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "datafos".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_per_page: 10,
            max_per_page: 1000,
        }
    }
}

impl Config {
    /// Load from `datafos.toml` in the working directory (if any) and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load using an explicit configuration file instead of `datafos.toml`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();

        let defaults = config::Config::try_from(&Config::default())?;
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("datafos").required(false),
        };

        let config: Config = config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("DATAFOS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(Error::Config("database.url must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(Error::Config("database.max_connections must be at least 1".into()));
        }
        if self.search.default_per_page == 0 {
            return Err(Error::Config("search.default_per_page must be at least 1".into()));
        }
        if self.search.max_per_page < self.search.default_per_page {
            return Err(Error::Config(
                "search.max_per_page must not be smaller than search.default_per_page".into(),
            ));
        }
        if !matches!(
            self.logging.file_rotation.as_str(),
            "daily" | "hourly" | "minutely" | "never"
        ) {
            return Err(Error::Config(format!(
                "logging.file_rotation must be daily, hourly, minutely or never, got {:?}",
                self.logging.file_rotation
            )));
        }
        Ok(())
    }

    /// Configuration backed by a private in-memory database.
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;
        config
    }
}
