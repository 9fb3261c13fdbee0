//! Storage module for the mirrored entities
//!
//! This module handles everything on the destination side, including:
//! - Per-site table definitions for SQLite and MySQL
//! - The [`RowStore`] seam and its SQLite and MySQL implementations
//! - Mapping detail records to normalized rows
//! - Idempotent replace-writes and existence checks

mod mysql;
mod provider;
mod rows;
mod schema;
mod sqlite;
mod store;
mod writer;

pub use mysql::MySqlStore;
pub use provider::{ConnectionProvider, PerCallProvider, SharedConnectionProvider};
pub use rows::{
    column_value, debut_date, gallery_row, model_row, published_date, relation_rows,
    split_measurements, Row, SqlValue,
};
pub use schema::{initialize_schema, Dialect, SiteTables};
pub use sqlite::SqliteStore;
pub use store::RowStore;
pub use writer::Writer;

use crate::config::DatabaseConfig;
use crate::Result;
use std::path::Path;

/// Opens a per-call writer on the SQLite file at `path`
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `site_name` - Site whose tables the writer targets
///
/// # Returns
///
/// * `Ok(Writer)` - Writer with the site's tables in place
/// * `Err(IngestError)` - The store could not be opened or initialized
pub async fn open_sqlite_writer(
    path: &Path,
    site_name: &str,
) -> Result<Writer<SqliteStore<PerCallProvider>>> {
    Writer::new(SqliteStore::open(path)?, site_name).await
}

/// Opens a per-call writer on the MySQL server in `config`
///
/// Fails if the server cannot be reached while creating the site's tables.
pub async fn open_mysql_writer(
    config: &DatabaseConfig,
    site_name: &str,
) -> Result<Writer<MySqlStore>> {
    Writer::new(MySqlStore::new(config), site_name).await
}
