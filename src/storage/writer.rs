//! Persistence writer
//!
//! The writer is the only component that touches the destination store. Each
//! row is written with its own replace statement; there is no transaction
//! spanning a gallery and its relation rows.

use crate::config::validate_site_name;
use crate::source::{Kind, Record};
use crate::storage::rows::{gallery_row, model_row, relation_rows, Row};
use crate::storage::schema::SiteTables;
use crate::storage::store::RowStore;
use crate::Result;

/// Writes mapped rows for one site
pub struct Writer<S> {
    store: S,
    tables: SiteTables,
}

impl<S: RowStore> Writer<S> {
    /// Creates a writer for `site_name` and makes sure its tables exist
    pub async fn new(store: S, site_name: &str) -> Result<Self> {
        validate_site_name(site_name)?;

        let tables = SiteTables::for_site(site_name);
        store.create_tables(&tables).await?;

        Ok(Self { store, tables })
    }

    pub fn tables(&self) -> &SiteTables {
        &self.tables
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Inserts `row`, replacing any row with the same key
    ///
    /// The replacement is a whole-row replace: columns absent from `row`
    /// end up NULL.
    pub async fn replace_row(&self, table: &str, row: &Row) -> Result<()> {
        self.store.replace(table, row).await
    }

    /// Whether a row keyed by `uuid` exists in `table`
    pub async fn exists(&self, table: &str, uuid: &str) -> Result<bool> {
        self.store.exists(table, uuid).await
    }

    pub async fn gallery_exists(&self, uuid: &str) -> Result<bool> {
        self.exists(&self.tables.gallery, uuid).await
    }

    /// Writes a gallery or movie, then one relation row per listed model
    ///
    /// Returns the number of rows written.
    pub async fn write_gallery(&self, kind: Kind, record: &Record) -> Result<usize> {
        let row = gallery_row(kind, record)?;
        let relations = relation_rows(record)?;

        self.replace_row(&self.tables.gallery, &row).await?;
        for relation in &relations {
            self.replace_row(&self.tables.model_gallery, relation).await?;
        }

        Ok(1 + relations.len())
    }

    /// Writes a model row; returns the number of rows written
    pub async fn write_model(&self, record: &Record) -> Result<usize> {
        let row = model_row(record)?;
        self.replace_row(&self.tables.model, &row).await?;
        Ok(1)
    }

    /// Number of rows in `table`
    pub async fn count_rows(&self, table: &str) -> Result<u64> {
        self.store.count(table).await
    }
}
