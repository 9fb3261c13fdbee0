//! Connection providers for the SQLite store
//!
//! [`SqliteStore`](crate::storage::SqliteStore) never holds a connection
//! itself; it asks a provider for one per read or write. [`PerCallProvider`]
//! opens and closes a connection every time. [`SharedConnectionProvider`]
//! keeps a single connection open and is the drop-in for deployments (and
//! tests) that want reuse.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Source of database connections for the writer
pub trait ConnectionProvider {
    /// Runs `f` with a connection, releasing it according to the provider's policy
    fn with_connection<T, F>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>;
}

/// Opens a fresh connection for every call
#[derive(Debug, Clone)]
pub struct PerCallProvider {
    path: PathBuf,
}

impl PerCallProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }
}

impl ConnectionProvider for PerCallProvider {
    fn with_connection<T, F>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.open()?;
        let result = f(&conn);
        let closed = conn.close().map_err(|(_, e)| e);
        let value = result?;
        closed?;
        Ok(value)
    }
}

/// Reuses one connection across calls
pub struct SharedConnectionProvider {
    conn: Mutex<Connection>,
}

impl SharedConnectionProvider {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        Ok(Self::new(Connection::open(path)?))
    }

    pub fn in_memory() -> rusqlite::Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }
}

impl ConnectionProvider for SharedConnectionProvider {
    fn with_connection<T, F>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        // A panic in a previous caller leaves the connection itself usable.
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&conn)
    }
}
