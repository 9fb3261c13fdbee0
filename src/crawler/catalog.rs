//! The two ingestion configurations of the crawl engine
//!
//! A [`Catalog`] tells the engine which kinds to walk, how to address an
//! item's detail record, whether an item can be skipped, and how to persist
//! it. Page sizes come from [`Kind::page_size`].

use crate::crawler::slug::{date_fragment, percent_slug, substitution_slug};
use crate::source::{Kind, Record};
use crate::storage::{RowStore, Writer};
use crate::Result;
use async_trait::async_trait;

/// One paginated-list + detail + write pipeline
#[async_trait]
pub trait Catalog: Sync {
    /// Human-readable name used in logs
    fn label(&self) -> &'static str;

    /// Kinds to crawl, in order
    fn kinds(&self) -> &'static [Kind];

    /// Slug addressing the detail record of an item named `name`
    fn slug(&self, name: &str) -> String;

    /// Date fragment for the detail request, if this catalog uses one
    fn detail_date<'a>(&self, summary: &'a Record) -> Result<Option<&'a str>>;

    /// Whether the item is already mirrored and its detail fetch can be skipped
    async fn is_ingested<S: RowStore>(
        &self,
        writer: &Writer<S>,
        summary: &Record,
    ) -> Result<bool>;

    /// Writes a detail record; returns the number of rows written
    async fn persist<S: RowStore>(
        &self,
        writer: &Writer<S>,
        kind: Kind,
        detail: &Record,
    ) -> Result<usize>;
}

/// Movies then galleries, skipping items already in the gallery table
#[derive(Debug, Clone, Copy, Default)]
pub struct GalleryCatalog;

#[async_trait]
impl Catalog for GalleryCatalog {
    fn label(&self) -> &'static str {
        "gallery"
    }

    fn kinds(&self) -> &'static [Kind] {
        &[Kind::Movie, Kind::Gallery]
    }

    fn slug(&self, name: &str) -> String {
        substitution_slug(name)
    }

    fn detail_date<'a>(&self, summary: &'a Record) -> Result<Option<&'a str>> {
        date_fragment(summary.require_str("path")?).map(Some)
    }

    async fn is_ingested<S: RowStore>(
        &self,
        writer: &Writer<S>,
        summary: &Record,
    ) -> Result<bool> {
        writer.gallery_exists(summary.require_str("UUID")?).await
    }

    async fn persist<S: RowStore>(
        &self,
        writer: &Writer<S>,
        kind: Kind,
        detail: &Record,
    ) -> Result<usize> {
        writer.write_gallery(kind, detail).await
    }
}

/// Models, always re-fetched and re-written
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelCatalog;

#[async_trait]
impl Catalog for ModelCatalog {
    fn label(&self) -> &'static str {
        "model"
    }

    fn kinds(&self) -> &'static [Kind] {
        &[Kind::Model]
    }

    fn slug(&self, name: &str) -> String {
        percent_slug(name)
    }

    fn detail_date<'a>(&self, _summary: &'a Record) -> Result<Option<&'a str>> {
        Ok(None)
    }

    async fn is_ingested<S: RowStore>(
        &self,
        _writer: &Writer<S>,
        _summary: &Record,
    ) -> Result<bool> {
        Ok(false)
    }

    async fn persist<S: RowStore>(
        &self,
        writer: &Writer<S>,
        _kind: Kind,
        detail: &Record,
    ) -> Result<usize> {
        writer.write_model(detail).await
    }
}
