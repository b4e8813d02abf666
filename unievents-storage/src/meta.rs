//! Sync metadata (`sync_meta` key/value table).

use crate::error::StorageResult;
use crate::store::{LocalStore, degrade};
use chrono::{DateTime, Utc};
use duckdb::{Connection, params};

pub(crate) const SNAPSHOT_KEY: &str = "snapshot_taken_at";
pub(crate) const LAST_ENQUEUE_KEY: &str = "last_enqueue_ms";

impl LocalStore {
    /// When the cache was last seeded from a server snapshot.
    pub fn snapshot_taken_at(&self) -> Option<DateTime<Utc>> {
        let result = self.with_conn(|conn| {
            Ok(read(conn, SNAPSHOT_KEY)?
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(DateTime::from_timestamp_millis))
        });
        degrade("read snapshot time", result, None)
    }

    /// Records that the cache was seeded from a server snapshot at `at`.
    pub fn mark_snapshot(&self, at: DateTime<Utc>) -> bool {
        let result = self.with_conn(|conn| {
            write(conn, SNAPSHOT_KEY, &at.timestamp_millis().to_string())?;
            Ok(true)
        });
        degrade("record snapshot time", result, false)
    }
}

pub(crate) fn read(conn: &Connection, key: &str) -> StorageResult<Option<String>> {
    match conn.query_row(
        "SELECT value FROM sync_meta WHERE key = ?",
        params![key],
        |row| row.get::<_, String>(0),
    ) {
        Ok(value) => Ok(Some(value)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn write(conn: &Connection, key: &str, value: &str) -> StorageResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO sync_meta (key, value) VALUES (?, ?)",
        params![key, value],
    )?;
    Ok(())
}
