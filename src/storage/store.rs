//! Store trait definition
//!
//! [`RowStore`] is the contract the writer needs from a destination
//! database: create the site's tables, replace whole rows, and count rows.
//! [`SqliteStore`](crate::storage::SqliteStore) and
//! [`MySqlStore`](crate::storage::MySqlStore) implement it.

use crate::storage::rows::Row;
use crate::storage::schema::SiteTables;
use crate::Result;
use async_trait::async_trait;

/// Destination database for mapped rows
///
/// Implementations must be `Send + Sync`; every call is independent and no
/// transaction spans two calls.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Creates any of the site's tables that do not exist yet
    async fn create_tables(&self, tables: &SiteTables) -> Result<()>;

    /// Inserts `row` into `table`, replacing any row with the same key
    async fn replace(&self, table: &str, row: &Row) -> Result<()>;

    /// Whether `table` holds a row keyed by `uuid`
    async fn exists(&self, table: &str, uuid: &str) -> Result<bool>;

    /// Number of rows in `table`
    async fn count(&self, table: &str) -> Result<u64>;
}
