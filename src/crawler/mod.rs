//! Crawler module: the crawl driver and its two configurations
//!
//! This module contains the crawl logic, including:
//! - Page math and descending page order
//! - Slug and date-fragment derivation
//! - The generic list/detail/write engine
//! - Gallery/movie and model catalogs

mod catalog;
mod engine;
mod pages;
mod slug;

pub use catalog::{Catalog, GalleryCatalog, ModelCatalog};
pub use engine::{Engine, IngestStats};
pub use pages::{descending_pages, page_count};
pub use slug::{date_fragment, percent_slug, substitution_slug, FORBIDDEN_SLUG_CHARS};

use crate::config::{Credentials, StoreBackend};
use crate::source::{build_http_client, RetryPolicy, SourceClient};
use crate::storage::{open_mysql_writer, open_sqlite_writer, RowStore, Writer};
use crate::Result;

/// Runs a complete ingest of one catalog for one site
///
/// This is the main entry point used by the binaries. It will:
/// 1. Build the HTTP client and source client for the site
/// 2. Open the destination store named by `store.backend` and create missing tables
/// 3. Walk the catalog's kinds and write what is missing
///
/// # Arguments
///
/// * `catalog` - Which pipeline to run
/// * `credentials` - Loaded credentials file
/// * `site_name` - Site to crawl
/// * `accept_invalid_certs` - Skip TLS verification for this client
///
/// # Returns
///
/// * `Ok(IngestStats)` - Ingest completed
/// * `Err(IngestError)` - A data-shape, store, or exhausted-retry error
pub async fn ingest<C: Catalog>(
    catalog: &C,
    credentials: &Credentials,
    site_name: &str,
    accept_invalid_certs: bool,
) -> Result<IngestStats> {
    let http = build_http_client(&credentials.api, accept_invalid_certs)?;
    let client = SourceClient::new(
        http,
        credentials.api.site_base_url(site_name),
        RetryPolicy::from_config(&credentials.retry),
    );

    match credentials.store.backend {
        StoreBackend::Mysql => {
            let mysql = &credentials.mysql;
            tracing::info!(
                "Writing to MySQL database {} on {}:{}",
                mysql.database,
                mysql.host,
                mysql.port
            );
            let writer = open_mysql_writer(mysql, site_name).await?;
            run_with(catalog, &client, &writer).await
        }
        StoreBackend::Sqlite => {
            let store_path = credentials.store_path();
            tracing::warn!(
                "Writing to SQLite file {}; mysql host and login are not used",
                store_path.display()
            );
            let writer = open_sqlite_writer(&store_path, site_name).await?;
            run_with(catalog, &client, &writer).await
        }
    }
}

async fn run_with<C: Catalog, S: RowStore>(
    catalog: &C,
    client: &SourceClient,
    writer: &Writer<S>,
) -> Result<IngestStats> {
    Engine::new(client, writer).run(catalog).await
}
