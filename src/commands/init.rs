//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::ProductStore;
use std::path::PathBuf;
use tracing::info;

/// Write the default config and create the database schema
pub async fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<Config> {
    let mut config = Config::default();

    let base = base_dir.unwrap_or_else(Config::default_base_dir);
    config.paths.config_file = base.join("config.toml");
    config.paths.db_file = base.join("products.db");
    config.paths.base_dir = base;

    if config.is_initialized() && !force {
        return Err(Error::AlreadyInitialized(
            config.paths.base_dir.display().to_string(),
        ));
    }

    config.save()?;

    let store = ProductStore::connect(&config).await?;
    store.init_schema().await?;

    info!("Initialized pricewatch at {:?}", config.paths.base_dir);
    Ok(config)
}

pub fn print_init(config: &Config) {
    println!("✓ Initialized pricewatch");
    println!("  Config:   {}", config.paths.config_file.display());
    println!("  Database: {}", config.paths.db_file.display());
    println!();
    println!("Add product page URLs to the config under `urls`, then run 'pricewatch scrape'.");
}
