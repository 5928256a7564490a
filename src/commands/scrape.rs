//! Scrape command implementation

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::{Pipeline, ScrapeReport};
use crate::store::ProductStore;
use tracing::{info, warn};

/// Run the scraping pipeline over the configured (or overriding) URL list
///
/// URLs are pre-filtered with the advisory HEAD check; a URL that passes can
/// still fail during the main fetch.
pub async fn cmd_scrape(
    config: &Config,
    store: &ProductStore,
    urls: Option<Vec<String>>,
) -> Result<ScrapeReport> {
    let urls = urls.unwrap_or_else(|| config.urls.clone());
    if urls.is_empty() {
        warn!("No URLs to scrape; add some to the config or pass them as arguments");
        return Ok(ScrapeReport::default());
    }

    let pipeline = Pipeline::new(config.scrape.clone())?;

    let mut valid_urls = Vec::with_capacity(urls.len());
    for url in &urls {
        if pipeline.validate_url(url).await {
            valid_urls.push(url.clone());
        }
    }
    if valid_urls.len() != urls.len() {
        warn!("{} invalid URLs were skipped", urls.len() - valid_urls.len());
    }

    info!("Scraping {} URLs", valid_urls.len());
    pipeline.run(&valid_urls, &config.properties, store).await
}

pub fn print_scrape_report(report: &ScrapeReport) {
    println!(
        "Scraped {} products, skipped {}",
        report.scraped.len(),
        report.skipped.len()
    );

    for item in &report.scraped {
        println!("  ✓ {} ({}) {}", item.product_name, item.price, item.url);
    }
    for item in &report.skipped {
        println!("  ✗ {} ({})", item.url, item.reason);
    }
}
