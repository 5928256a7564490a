//! The extract-validate-persist pipeline
//!
//! Drives the per-URL sequence: fetch with a bounded timeout, extract the
//! requested properties, check completeness, upsert into the store. Each URL
//! is processed independently and sequentially; per-item failures become
//! explicit [`ItemOutcome`] values that are logged and skipped, so a run is
//! a fold over outcomes rather than caught exceptions. Only setup failures
//! (store unreachable, client construction) abort the batch.

use crate::config::ScrapeConfig;
use crate::error::{Error, Result};
use crate::extract::{extract_fields, ExtractedFields};
use crate::store::ProductStore;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of processing a single URL
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// Extraction succeeded and the row was written
    Scraped(ExtractedFields),
    /// The URL was skipped; the batch continues
    Skipped(SkipReason),
}

/// Why a URL was skipped
#[derive(Debug, Clone)]
pub enum SkipReason {
    /// Transport failure: timeout, connection error, or non-2xx status
    Fetch(String),
    /// One or more required properties were absent or empty after extraction
    Incomplete(Vec<String>),
    /// The extracted values failed store validation (e.g. unparseable price)
    Invalid(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Fetch(detail) => write!(f, "fetch failed: {}", detail),
            SkipReason::Incomplete(missing) => {
                write!(f, "missing required properties: {}", missing.join(", "))
            }
            SkipReason::Invalid(detail) => write!(f, "invalid field values: {}", detail),
        }
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeReport {
    /// Successfully scraped and persisted product names with their URLs
    pub scraped: Vec<ScrapedItem>,
    /// Skipped URLs with a human-readable reason
    pub skipped: Vec<SkippedItem>,
}

/// A successfully processed URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedItem {
    pub url: String,
    pub product_name: String,
    pub price: String,
}

/// A skipped URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedItem {
    pub url: String,
    pub reason: String,
}

/// Scraping pipeline state
pub struct Pipeline {
    client: Client,
    config: ScrapeConfig,
}

impl Pipeline {
    /// Create a new pipeline
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Run the pipeline over a URL list
    ///
    /// Every per-item failure is logged and skipped; the report lists both
    /// sides. Store errors propagate and abort the batch.
    pub async fn run(
        &self,
        urls: &[String],
        properties: &[String],
        store: &ProductStore,
    ) -> Result<ScrapeReport> {
        let mut report = ScrapeReport::default();

        for url in urls {
            match self.process(url, properties, store).await? {
                ItemOutcome::Scraped(fields) => {
                    info!("Scraped and saved: {}", url);
                    report.scraped.push(ScrapedItem {
                        url: url.clone(),
                        product_name: fields
                            .get(crate::extract::PROP_TITLE)
                            .unwrap_or_default()
                            .to_string(),
                        price: fields
                            .get(crate::extract::PROP_PRICE)
                            .unwrap_or_default()
                            .to_string(),
                    });
                }
                ItemOutcome::Skipped(reason) => {
                    warn!("Skipping {}: {}", url, reason);
                    report.skipped.push(SkippedItem {
                        url: url.clone(),
                        reason: reason.to_string(),
                    });
                }
            }
        }

        info!(
            "Pipeline finished: {} scraped, {} skipped",
            report.scraped.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Process a single URL: fetch, extract, check, persist
    ///
    /// Transport and completeness failures come back as `Skipped`; store
    /// failures are returned as errors for the caller to decide on.
    async fn process(
        &self,
        url: &str,
        properties: &[String],
        store: &ProductStore,
    ) -> Result<ItemOutcome> {
        let content = match self.fetch_page(url).await {
            Ok(content) => content,
            Err(e) => return Ok(ItemOutcome::Skipped(SkipReason::Fetch(e.to_string()))),
        };

        let fields = extract_fields(&content, properties);

        let missing = fields.missing(properties);
        if !missing.is_empty() {
            return Ok(ItemOutcome::Skipped(SkipReason::Incomplete(missing)));
        }

        match store.upsert(&fields).await {
            Ok(_) => Ok(ItemOutcome::Scraped(fields)),
            Err(Error::Validation(detail)) => {
                Ok(ItemOutcome::Skipped(SkipReason::Invalid(detail)))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch a page body, treating non-2xx statuses as failures
    async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("Fetching: {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("HTTP {}: {}", status, url)));
        }

        Ok(response.text().await?)
    }

    /// Lightweight existence check for a URL
    ///
    /// Issues a HEAD request with a short timeout and reports `true` only on
    /// an HTTP success status. Any transport failure means `false`; this
    /// never returns an error. Advisory only: a URL that passes can still
    /// fail during the main fetch.
    pub async fn validate_url(&self, url: &str) -> bool {
        if Url::parse(url).is_err() {
            return false;
        }

        let request = self
            .client
            .head(url)
            .timeout(Duration::from_secs(self.config.validate_timeout_secs));

        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Validation failed for {}: {}", url, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrapeConfig;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn product_html(name: &str, url: &str, price: &str) -> String {
        format!(
            r#"<html><head>
            <meta property="og:title" content="{}" />
            <meta property="og:url" content="{}" />
            <meta property="product:price:amount" content="{}" />
            </head><body>
            <span class="product-delivery-time">timer 1-2 days</span>
            </body></html>"#,
            name, url, price
        )
    }

    fn properties() -> Vec<String> {
        crate::config::default_properties()
    }

    async fn setup() -> (Pipeline, ProductStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = ProductStore::new(&tmp.path().join("test.db")).await.unwrap();
        let pipeline = Pipeline::new(ScrapeConfig::default()).unwrap();
        (pipeline, store, tmp)
    }

    #[tokio::test]
    async fn test_run_persists_complete_pages() {
        let server = MockServer::start().await;
        let (pipeline, store, _tmp) = setup().await;

        Mock::given(method("GET"))
            .and(path("/product/1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                product_html("Widget", "http://shop/1", "19.99").into_bytes(),
                "text/html",
            ))
            .mount(&server)
            .await;

        let urls = vec![format!("{}/product/1", server.uri())];
        let report = pipeline.run(&urls, &properties(), &store).await.unwrap();

        assert_eq!(report.scraped.len(), 1);
        assert!(report.skipped.is_empty());

        let row = store.get_by_url("http://shop/1").await.unwrap().unwrap();
        assert_eq!(row.product_name, "Widget");
        assert_eq!(row.price, 19.99);
        assert_eq!(row.delivery_time.as_deref(), Some("1-2 days"));
    }

    #[tokio::test]
    async fn test_one_failure_among_three_skips_only_that_url() {
        let server = MockServer::start().await;
        let (pipeline, store, _tmp) = setup().await;

        for (route, name) in [("/product/1", "First"), ("/product/3", "Third")] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_raw(
                    product_html(name, &format!("http://shop{}", route), "10.00").into_bytes(),
                    "text/html",
                ))
                .mount(&server)
                .await;
        }

        Mock::given(method("GET"))
            .and(path("/product/2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let urls: Vec<String> = (1..=3)
            .map(|i| format!("{}/product/{}", server.uri(), i))
            .collect();

        let report = pipeline.run(&urls, &properties(), &store).await.unwrap();

        assert_eq!(report.scraped.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("500"));
        assert_eq!(store.count().await.unwrap(), 2);
        assert!(store
            .get_by_url("http://shop/product/2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_unparseable_price_is_skipped_not_fatal() {
        let server = MockServer::start().await;
        let (pipeline, store, _tmp) = setup().await;

        // Comma decimal separator does not parse as f64
        Mock::given(method("GET"))
            .and(path("/product/1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                product_html("Bad Price", "http://shop/bad", "49,99").into_bytes(),
                "text/html",
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/product/2"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                product_html("Good Price", "http://shop/good", "49.99").into_bytes(),
                "text/html",
            ))
            .mount(&server)
            .await;

        let urls: Vec<String> = (1..=2)
            .map(|i| format!("{}/product/{}", server.uri(), i))
            .collect();

        let report = pipeline.run(&urls, &properties(), &store).await.unwrap();

        assert_eq!(report.scraped.len(), 1);
        assert_eq!(report.scraped[0].product_name, "Good Price");
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("49,99"));
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.get_by_url("http://shop/bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_incomplete_page_is_skipped_without_write() {
        let server = MockServer::start().await;
        let (pipeline, store, _tmp) = setup().await;

        // Page with no price tag
        let html = r#"<html><head>
            <meta property="og:title" content="Widget" />
            <meta property="og:url" content="http://shop/1" />
            </head></html>"#;

        Mock::given(method("GET"))
            .and(path("/product/1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(html.as_bytes().to_vec(), "text/html"))
            .mount(&server)
            .await;

        let urls = vec![format!("{}/product/1", server.uri())];
        let report = pipeline.run(&urls, &properties(), &store).await.unwrap();

        assert!(report.scraped.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("product:price:amount"));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_validate_url_true_on_success() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/product/1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let pipeline = Pipeline::new(ScrapeConfig::default()).unwrap();
        assert!(pipeline.validate_url(&format!("{}/product/1", server.uri())).await);
    }

    #[tokio::test]
    async fn test_validate_url_false_on_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let pipeline = Pipeline::new(ScrapeConfig::default()).unwrap();
        assert!(!pipeline.validate_url(&format!("{}/missing", server.uri())).await);
    }

    #[tokio::test]
    async fn test_validate_url_false_on_transport_error() {
        let pipeline = Pipeline::new(ScrapeConfig::default()).unwrap();

        // Nothing listens here; the connection error must map to false.
        assert!(!pipeline.validate_url("http://127.0.0.1:1/unreachable").await);
        assert!(!pipeline.validate_url("not a url").await);
    }
}
