//! pricewatch CLI entry point

use clap::{Parser, Subcommand};
use pricewatch::{
    commands::{
        cmd_clear, cmd_init, cmd_list, cmd_migrate, cmd_scrape, print_init,
        print_migration_report, print_products, print_scrape_report,
    },
    config::Config,
    error::Result,
    pipeline::Pipeline,
    store::ProductStore,
    web::{self, AppState},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pricewatch")]
#[command(version, about = "Product price scraper with a refreshable web dashboard", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize pricewatch configuration and database
    Init {
        /// Base directory (defaults to ~/.pricewatch)
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Scrape the configured product pages and store the results
    Scrape {
        /// URLs to scrape instead of the configured list
        urls: Vec<String>,
    },

    /// List stored products, newest first
    List,

    /// Serve the web dashboard
    Serve {
        /// Listen address override (e.g. 127.0.0.1:8080)
        #[arg(long)]
        listen: Option<String>,
    },

    /// Delete every stored product
    Clear {
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Rebuild the products table with the URL uniqueness constraint,
    /// deduplicating rows from databases created before it existed
    Migrate,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Handle init specially (doesn't need existing config)
    if let Commands::Init { base_dir, force } = &cli.command {
        let config = cmd_init(base_dir.clone(), *force).await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            print_init(&config);
        }
        return Ok(());
    }

    // Load configuration
    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_from(None)?,
    };

    let store = ProductStore::connect(&config).await?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),

        Commands::Scrape { urls } => {
            let urls = if urls.is_empty() { None } else { Some(urls) };
            let report = cmd_scrape(&config, &store, urls).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_scrape_report(&report);
            }
        }

        Commands::List => {
            let records = cmd_list(&store).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_products(&records);
            }
        }

        Commands::Serve { listen } => {
            let mut config = config;
            if let Some(addr) = listen {
                config.web.listen_addr = addr;
                config.validate()?;
            }

            let pipeline = Pipeline::new(config.scrape.clone())?;
            let state = AppState {
                store,
                pipeline: Arc::new(pipeline),
                config: Arc::new(config),
            };

            web::serve(state).await?;
        }

        Commands::Clear { yes } => {
            if !yes {
                println!("This deletes every stored product. Re-run with --yes to confirm.");
                return Ok(());
            }

            let cleared = cmd_clear(&store).await?;
            if cli.json {
                println!("{}", serde_json::json!({ "cleared": cleared }));
            } else {
                println!("✓ Cleared {} products", cleared);
            }
        }

        Commands::Migrate => {
            let report = cmd_migrate(&store).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_migration_report(&report);
            }
        }
    }

    Ok(())
}
