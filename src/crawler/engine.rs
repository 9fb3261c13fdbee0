//! Crawl driver
//!
//! Walks every kind of a [`Catalog`] page by page, highest page first, and
//! hands each item that is not yet mirrored to the writer. Everything runs
//! sequentially: one request or write at a time, pages in descending order,
//! items in list order.

use crate::crawler::catalog::Catalog;
use crate::crawler::pages::{descending_pages, page_count};
use crate::source::{Kind, Record, SourceClient};
use crate::storage::{RowStore, Writer};
use crate::Result;

/// Counters for one engine run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub pages_visited: u64,
    pub items_seen: u64,
    pub items_skipped: u64,
    pub details_fetched: u64,
    pub rows_written: u64,
}

/// Generic list -> detail -> write engine
pub struct Engine<'a, S> {
    client: &'a SourceClient,
    writer: &'a Writer<S>,
}

impl<'a, S: RowStore> Engine<'a, S> {
    pub fn new(client: &'a SourceClient, writer: &'a Writer<S>) -> Self {
        Self { client, writer }
    }

    /// Crawls every kind of `catalog`
    pub async fn run<C: Catalog>(&self, catalog: &C) -> Result<IngestStats> {
        tracing::info!("Starting {} ingest from {}", catalog.label(), self.client.base_url());

        let mut stats = IngestStats::default();
        for &kind in catalog.kinds() {
            self.run_kind(catalog, kind, &mut stats).await?;
        }

        tracing::info!(
            "Finished {} ingest: {} pages, {} items seen, {} skipped, {} fetched, {} rows written",
            catalog.label(),
            stats.pages_visited,
            stats.items_seen,
            stats.items_skipped,
            stats.details_fetched,
            stats.rows_written
        );

        Ok(stats)
    }

    async fn run_kind<C: Catalog>(
        &self,
        catalog: &C,
        kind: Kind,
        stats: &mut IngestStats,
    ) -> Result<()> {
        let total = self.client.list_count(kind).await?;
        if total <= 0 {
            tracing::info!("No {} items on this site", kind);
            return Ok(());
        }

        let pages = page_count(total, kind.page_size());
        tracing::info!("{} {} items across {} pages", total, kind, pages);

        for page in descending_pages(total, kind.page_size()) {
            tracing::info!("{} page {}/{}", kind, page, pages);

            let summaries = self.client.list_page(kind, page).await?;
            stats.pages_visited += 1;

            if summaries.is_empty() {
                tracing::info!("No {} items on page {}", kind, page);
                continue;
            }

            for summary in &summaries {
                self.ingest_item(catalog, kind, summary, stats).await?;
            }
        }

        Ok(())
    }

    async fn ingest_item<C: Catalog>(
        &self,
        catalog: &C,
        kind: Kind,
        summary: &Record,
        stats: &mut IngestStats,
    ) -> Result<()> {
        stats.items_seen += 1;

        if catalog.is_ingested(self.writer, summary).await? {
            stats.items_skipped += 1;
            return Ok(());
        }

        let slug = catalog.slug(summary.require_str("name")?);
        let date = catalog.detail_date(summary)?;
        tracing::info!("{}", slug);

        let detail = self.client.detail(kind, &slug, date).await?;
        stats.details_fetched += 1;

        let rows = catalog.persist(self.writer, kind, &detail).await?;
        stats.rows_written += rows as u64;

        Ok(())
    }
}
