//! Web dashboard
//!
//! Serves the product table and the two calls the UI needs: get all
//! products as display records, and re-run the pipeline now. Both are
//! synchronous from the client's point of view; a refresh blocks until the
//! full pipeline run returns. Per-URL scraping failures never fail a
//! request, only fatal store errors surface as a 500 with a short message.

use crate::config::Config;
use crate::display::{to_display, DisplayRecord};
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::store::ProductStore;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub store: ProductStore,
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<Config>,
}

/// Response to a refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub products: Vec<DisplayRecord>,
    pub scraped: usize,
    pub skipped: usize,
    pub refreshed_at: String,
}

/// Build the dashboard router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/products", get(list_products))
        .route("/api/refresh", post(refresh))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the dashboard server until shutdown
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.web.listen_addr.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// Get all products as display records
async fn list_products(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<DisplayRecord>>, (StatusCode, String)> {
    let products = state.store.list_all().await.map_err(internal_error)?;
    Ok(Json(to_display(&products)))
}

/// Re-run the full pipeline, then return the refreshed display records
async fn refresh(
    State(state): State<AppState>,
) -> std::result::Result<Json<RefreshResponse>, (StatusCode, String)> {
    info!("Refresh requested; re-running pipeline");

    let report = state
        .pipeline
        .run(&state.config.urls, &state.config.properties, &state.store)
        .await
        .map_err(internal_error)?;

    let products = state.store.list_all().await.map_err(internal_error)?;

    Ok(Json(RefreshResponse {
        products: to_display(&products),
        scraped: report.scraped.len(),
        skipped: report.skipped.len(),
        refreshed_at: Utc::now().to_rfc3339(),
    }))
}

fn internal_error(e: crate::error::Error) -> (StatusCode, String) {
    error!("Dashboard request failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Product Data</title>
<style>
  body { background: #272b30; color: #c8c8c8; font-family: sans-serif; margin: 2em; }
  h1 { color: #fff; }
  table { border-collapse: collapse; width: 100%; }
  th, td { text-align: left; padding: 0.5em 1em; border-bottom: 1px solid #3a3f44; }
  th { background: #1e1e1e; color: #fff; }
  td { background: #323232; }
  a { color: #7fdbff; }
  button { padding: 0.5em 1em; margin-bottom: 1em; cursor: pointer; }
  #status { margin-bottom: 1em; }
</style>
</head>
<body>
<h1>Product Data</h1>
<button id="refresh">Refresh Data</button>
<div id="status">Last updated: never</div>
<table>
  <thead>
    <tr><th>Product name</th><th>URL</th><th>Price</th><th>Delivery time</th></tr>
  </thead>
  <tbody id="rows"></tbody>
</table>
<script>
function render(products) {
  const rows = document.getElementById('rows');
  rows.innerHTML = '';
  for (const p of products) {
    const tr = document.createElement('tr');
    const link = document.createElement('a');
    link.href = p['URL'];
    link.textContent = 'Link';
    for (const key of ['Product name', 'URL', 'Price', 'Delivery time']) {
      const td = document.createElement('td');
      if (key === 'URL') { td.appendChild(link); } else { td.textContent = p[key]; }
      tr.appendChild(td);
    }
    rows.appendChild(tr);
  }
}

function setStatus(text) {
  document.getElementById('status').textContent = text;
}

async function loadProducts() {
  const res = await fetch('/api/products');
  if (!res.ok) { setStatus('Error: ' + await res.text()); return; }
  render(await res.json());
  setStatus('Last updated: ' + new Date().toLocaleString());
}

document.getElementById('refresh').addEventListener('click', async () => {
  setStatus('Refreshing...');
  const res = await fetch('/api/refresh', { method: 'POST' });
  if (!res.ok) { setStatus('Error refreshing data: ' + await res.text()); return; }
  const body = await res.json();
  render(body.products);
  setStatus('Last updated: ' + new Date().toLocaleString()
    + ' (' + body.scraped + ' scraped, ' + body.skipped + ' skipped)');
});

loadProducts();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::extract::{PROP_PRICE, PROP_TITLE, PROP_URL};
    use tempfile::TempDir;

    async fn setup_state(urls: Vec<String>) -> (AppState, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = ProductStore::new(&tmp.path().join("test.db")).await.unwrap();

        let mut config = Config::default();
        config.urls = urls;

        let pipeline = Pipeline::new(config.scrape.clone()).unwrap();

        (
            AppState {
                store,
                pipeline: Arc::new(pipeline),
                config: Arc::new(config),
            },
            tmp,
        )
    }

    #[tokio::test]
    async fn test_list_products_empty() {
        let (state, _tmp) = setup_state(Vec::new()).await;
        let Json(records) = list_products(State(state)).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_list_products_returns_display_records() {
        let (state, _tmp) = setup_state(Vec::new()).await;

        let mut fields = crate::extract::ExtractedFields::default();
        fields.set(PROP_TITLE, "Test Product");
        fields.set(PROP_URL, "http://test.com");
        fields.set(PROP_PRICE, "99.99");
        fields.delivery_time = Some("1-2 days".to_string());
        state.store.upsert(&fields).await.unwrap();

        let Json(records) = list_products(State(state)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, "€ 99.99");
        assert_eq!(records[0].delivery_time, "1-2 days");
    }

    #[tokio::test]
    async fn test_refresh_with_no_urls_returns_current_rows() {
        let (state, _tmp) = setup_state(Vec::new()).await;
        let Json(body) = refresh(State(state)).await.unwrap();

        assert_eq!(body.scraped, 0);
        assert_eq!(body.skipped, 0);
        assert!(body.products.is_empty());
    }

    #[tokio::test]
    async fn test_router_builds() {
        let (state, _tmp) = setup_state(Vec::new()).await;
        let _router = build_router(state);
    }
}
