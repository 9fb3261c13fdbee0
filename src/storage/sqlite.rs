//! SQLite-backed implementation of [`RowStore`]
//!
//! Connections come from a [`ConnectionProvider`], so the same store works
//! with a connection per call or one shared connection.

use crate::storage::provider::{ConnectionProvider, PerCallProvider};
use crate::storage::rows::{Row, SqlValue};
use crate::storage::schema::{initialize_schema, Dialect, SiteTables};
use crate::storage::store::RowStore;
use crate::Result;
use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params, params_from_iter, ToSql};
use std::path::Path;

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            SqlValue::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            SqlValue::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// SQLite store over a connection provider
pub struct SqliteStore<P> {
    provider: P,
}

impl<P: ConnectionProvider> SqliteStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl SqliteStore<PerCallProvider> {
    /// Store on the file at `path`, creating its parent directory if needed
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(PerCallProvider::new(path)))
    }
}

#[async_trait]
impl<P: ConnectionProvider + Send + Sync> RowStore for SqliteStore<P> {
    async fn create_tables(&self, tables: &SiteTables) -> Result<()> {
        self.provider
            .with_connection(|conn| initialize_schema(conn, tables))?;
        Ok(())
    }

    async fn replace(&self, table: &str, row: &Row) -> Result<()> {
        let columns: Vec<&str> = row.iter().map(|(column, _)| *column).collect();
        let sql = Dialect::Sqlite.replace_sql(table, &columns);

        self.provider.with_connection(|conn| {
            conn.execute(&sql, params_from_iter(row.iter().map(|(_, value)| value)))
        })?;
        Ok(())
    }

    async fn exists(&self, table: &str, uuid: &str) -> Result<bool> {
        let sql = Dialect::Sqlite.count_uuid_sql(table);
        let count: i64 = self
            .provider
            .with_connection(|conn| conn.query_row(&sql, params![uuid], |row| row.get(0)))?;
        Ok(count > 0)
    }

    async fn count(&self, table: &str) -> Result<u64> {
        let sql = Dialect::Sqlite.count_sql(table);
        let count: i64 = self
            .provider
            .with_connection(|conn| conn.query_row(&sql, [], |row| row.get(0)))?;
        Ok(count as u64)
    }
}
