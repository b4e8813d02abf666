//! The local store handle and its schema.

use crate::error::{StorageError, StorageResult};
use duckdb::Connection;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

/// On-device cache of events plus the pending-mutation queue.
///
/// One connection is opened lazily by the owner and shared for the process
/// lifetime; clones share it. A store built with [`LocalStore::unavailable`]
/// (or whose open failed) answers every call with its empty result.
#[derive(Clone)]
pub struct LocalStore {
    conn: Option<Arc<Mutex<Connection>>>,
}

impl LocalStore {
    /// Opens or creates a local store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = connect(path)?;
        initialize_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Opens an in-memory local store (for testing and ephemeral sessions).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Opens the store, falling back to an unavailable store on failure.
    ///
    /// `None` opens an in-memory database.
    pub fn open_or_unavailable(path: Option<&Path>) -> Self {
        let opened = match path {
            Some(p) => Self::open(p),
            None => Self::open_in_memory(),
        };
        opened.unwrap_or_else(|e| {
            error!("failed to initialize offline storage: {e}");
            Self::unavailable()
        })
    }

    /// A store with no backing database. Every operation is a no-op.
    pub fn unavailable() -> Self {
        Self { conn: None }
    }

    /// Returns true if a database is attached.
    pub fn is_available(&self) -> bool {
        self.conn.is_some()
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Some(Arc::new(Mutex::new(conn))),
        }
    }

    /// Runs `f` against the connection, or fails with `Unavailable`.
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let conn = self.conn.as_ref().ok_or(StorageError::Unavailable)?;
        let guard = conn.lock().map_err(|_| StorageError::Poisoned)?;
        f(&guard)
    }

    /// Runs `f` inside a transaction, rolling back if it fails.
    pub(crate) fn with_transaction<T>(
        &self,
        f: impl FnOnce(&Connection) -> StorageResult<T>,
    ) -> StorageResult<T> {
        self.with_conn(|conn| {
            conn.execute_batch("BEGIN TRANSACTION")?;
            match f(conn) {
                Ok(value) => {
                    conn.execute_batch("COMMIT")?;
                    Ok(value)
                }
                Err(e) => {
                    if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                        warn!("rollback failed: {rollback_err}");
                    }
                    Err(e)
                }
            }
        })
    }
}

/// Unwraps a storage result at the public boundary, logging failures.
pub(crate) fn degrade<T>(op: &str, result: StorageResult<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(StorageError::Unavailable) => {
            debug!("offline storage unavailable, skipping {op}");
            fallback
        }
        Err(e) => {
            error!("failed to {op}: {e}");
            fallback
        }
    }
}

/// Cache sizes stay in the low megabytes.
const MEMORY_LIMIT: &str = "64MB";
const THREADS: u32 = 1;

/// Opens the database file. A `<file>.wal` left by an unclean shutdown can
/// block every later open, so when the first open fails with one present,
/// the log is discarded and the open retried once.
fn connect(path: &Path) -> StorageResult<Connection> {
    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(e) => {
            let wal = wal_path(path);
            if !wal.exists() {
                return Err(e.into());
            }
            warn!("offline storage open failed ({e}), discarding {}", wal.display());
            std::fs::remove_file(&wal)?;
            Connection::open(path)?
        }
    };
    conn.execute_batch(&format!(
        "SET memory_limit = '{MEMORY_LIMIT}'; SET threads = {THREADS};"
    ))?;
    Ok(conn)
}

fn wal_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".wal");
    PathBuf::from(name)
}

// No secondary index on `events.date`: DuckDB rejects INSERT OR REPLACE when
// a replaced column is indexed. Date lookups scan (zone maps prune).
fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id VARCHAR PRIMARY KEY,
            date VARCHAR NOT NULL,
            data_json TEXT NOT NULL
        );

        CREATE SEQUENCE IF NOT EXISTS pending_actions_seq START 1;

        CREATE TABLE IF NOT EXISTS pending_actions (
            id BIGINT PRIMARY KEY,
            action VARCHAR NOT NULL,
            data_json TEXT NOT NULL,
            timestamp_ms BIGINT NOT NULL,
            status VARCHAR NOT NULL DEFAULT 'pending',
            attempts INTEGER NOT NULL DEFAULT 0,
            last_error TEXT
        );

        CREATE TABLE IF NOT EXISTS sync_meta (
            key VARCHAR PRIMARY KEY,
            value VARCHAR NOT NULL
        );
        "#,
    )?;
    Ok(())
}
