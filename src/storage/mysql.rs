//! MySQL-backed implementation of [`RowStore`]
//!
//! Built from the `mysql` section of the credentials file. By default every
//! read or write opens its own connection and closes it afterwards; a store
//! built with [`MySqlStore::pooled`] borrows connections from an `sqlx` pool
//! instead. Writes are `REPLACE INTO`, one statement per row.

use crate::config::DatabaseConfig;
use crate::storage::rows::{Row, SqlValue};
use crate::storage::schema::{Dialect, SiteTables};
use crate::storage::store::RowStore;
use crate::Result;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::pool::PoolConnection;
use sqlx::{Connection, MySql, MySqlPool};
use std::time::Duration;

enum Source {
    PerCall {
        options: MySqlConnectOptions,
        timeout: Duration,
    },
    Pool(MySqlPool),
}

/// A connection held for one store call
enum Lease {
    Fresh(MySqlConnection),
    Pooled(PoolConnection<MySql>),
}

impl Lease {
    fn conn(&mut self) -> &mut MySqlConnection {
        match self {
            Lease::Fresh(conn) => conn,
            Lease::Pooled(conn) => &mut **conn,
        }
    }

    async fn release(self) -> Result<()> {
        if let Lease::Fresh(conn) = self {
            conn.close().await?;
        }
        Ok(())
    }
}

/// MySQL store
pub struct MySqlStore {
    source: Source,
}

impl MySqlStore {
    /// Store connecting with the host, port, username, password and database of `config`
    ///
    /// No connection is made until the first call.
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);

        Self {
            source: Source::PerCall {
                options,
                timeout: Duration::from_secs(config.connect_timeout_secs),
            },
        }
    }

    /// Store that reuses connections from `pool`
    pub fn pooled(pool: MySqlPool) -> Self {
        Self {
            source: Source::Pool(pool),
        }
    }

    async fn acquire(&self) -> Result<Lease> {
        match &self.source {
            Source::PerCall { options, timeout } => {
                let conn = tokio::time::timeout(*timeout, MySqlConnection::connect_with(options))
                    .await
                    .map_err(|_| {
                        sqlx::Error::Io(std::io::Error::new(
                            std::io::ErrorKind::TimedOut,
                            format!("no MySQL connection within {:?}", timeout),
                        ))
                    })??;
                Ok(Lease::Fresh(conn))
            }
            Source::Pool(pool) => Ok(Lease::Pooled(pool.acquire().await?)),
        }
    }
}

#[async_trait]
impl RowStore for MySqlStore {
    async fn create_tables(&self, tables: &SiteTables) -> Result<()> {
        let mut lease = self.acquire().await?;
        let mut result = Ok(());
        for statement in tables.create_statements(Dialect::MySql) {
            result = sqlx::query(&statement).execute(lease.conn()).await.map(|_| ());
            if result.is_err() {
                break;
            }
        }
        let released = lease.release().await;

        result?;
        released
    }

    async fn replace(&self, table: &str, row: &Row) -> Result<()> {
        let columns: Vec<&str> = row.iter().map(|(column, _)| *column).collect();
        let sql = Dialect::MySql.replace_sql(table, &columns);

        let mut query = sqlx::query(&sql);
        for (_, value) in row {
            query = match value {
                SqlValue::Null => query.bind(None::<String>),
                SqlValue::Integer(i) => query.bind(*i),
                SqlValue::Real(f) => query.bind(*f),
                SqlValue::Text(s) => query.bind(s.as_str()),
            };
        }

        let mut lease = self.acquire().await?;
        let result = query.execute(lease.conn()).await;
        let released = lease.release().await;

        result?;
        released
    }

    async fn exists(&self, table: &str, uuid: &str) -> Result<bool> {
        let sql = Dialect::MySql.count_uuid_sql(table);

        let mut lease = self.acquire().await?;
        let result: std::result::Result<i64, sqlx::Error> = sqlx::query_scalar(&sql)
            .bind(uuid)
            .fetch_one(lease.conn())
            .await;
        let released = lease.release().await;

        let count = result?;
        released?;
        Ok(count > 0)
    }

    async fn count(&self, table: &str) -> Result<u64> {
        let sql = Dialect::MySql.count_sql(table);

        let mut lease = self.acquire().await?;
        let result: std::result::Result<i64, sqlx::Error> =
            sqlx::query_scalar(&sql).fetch_one(lease.conn()).await;
        let released = lease.release().await;

        let count = result?;
        released?;
        Ok(count as u64)
    }
}
