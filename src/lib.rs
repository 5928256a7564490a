//! pricewatch: product price scraper with upsert storage and a refreshable
//! web dashboard
//!
//! The core is an extract-validate-persist pipeline: for each configured
//! product page URL, fetch the page, extract a fixed set of meta properties
//! plus the delivery-time span, check completeness, and upsert the result
//! into a SQLite table keyed by the unique URL. Per-item failures are logged
//! and skipped; only setup failures abort a run. The stored rows feed a
//! display adapter consumed by the CLI and the web dashboard.

pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod store;
pub mod web;
