//! Configuration management for pricewatch
//!
//! Handles loading, saving, and validating configuration from TOML files.
//! Every component receives its settings from here at construction time;
//! there is no module-level mutable state.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Product page URLs to scrape
    #[serde(default)]
    pub urls: Vec<String>,

    /// Meta properties to extract from each page
    #[serde(default = "default_properties")]
    pub properties: Vec<String>,

    /// Scraping configuration
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Web dashboard configuration
    #[serde(default)]
    pub web: WebConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Scraping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// User agent string sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Page fetch timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// URL validation (HEAD) timeout in seconds
    #[serde(default = "default_validate_timeout")]
    pub validate_timeout_secs: u64,
}

/// Web dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Address the dashboard listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for pricewatch data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to SQLite database
    pub db_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            properties: default_properties(),
            scrape: ScrapeConfig::default(),
            web: WebConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            fetch_timeout_secs: default_fetch_timeout(),
            validate_timeout_secs: default_validate_timeout(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Config {
    /// Get the default base directory for pricewatch (~/.pricewatch)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pricewatch")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            db_file: base.join("products.db"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Set up paths based on config file location
        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            db_file: base.join("products.db"),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Check if pricewatch is initialized (config and DB exist)
    pub fn is_initialized(&self) -> bool {
        self.paths.config_file.exists() && self.paths.db_file.exists()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.properties.is_empty() {
            return Err(Error::Config(
                "properties must name at least one meta property".to_string(),
            ));
        }

        if self.scrape.fetch_timeout_secs == 0 {
            return Err(Error::Config(
                "scrape.fetch_timeout_secs must be positive".to_string(),
            ));
        }

        if self.scrape.validate_timeout_secs == 0 {
            return Err(Error::Config(
                "scrape.validate_timeout_secs must be positive".to_string(),
            ));
        }

        if self.web.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(Error::Config(format!(
                "web.listen_addr is not a valid socket address: {}",
                self.web.listen_addr
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.properties.len(), 3);
        assert_eq!(config.scrape.fetch_timeout_secs, 10);
        assert_eq!(config.scrape.validate_timeout_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.urls = vec!["https://shop.example/product/1".to_string()];

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(loaded.urls, vec!["https://shop.example/product/1"]);
        assert_eq!(loaded.paths.db_file, tmp.path().join("products.db"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.properties.clear();
        assert!(config.validate().is_err());

        config.properties = default_properties();
        assert!(config.validate().is_ok());

        config.web.listen_addr = "not-an-addr".to_string();
        assert!(config.validate().is_err());
    }
}
