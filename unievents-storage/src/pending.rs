//! Pending-mutation queue.
//!
//! Entries are replayed strictly in insertion order. There is no priority
//! and no coalescing of repeated edits to the same event.

use crate::error::StorageResult;
use crate::meta::{self, LAST_ENQUEUE_KEY};
use crate::store::{LocalStore, degrade};
use chrono::{DateTime, Utc};
use duckdb::{Connection, params};
use tracing::{debug, warn};
use unievents_model::{EventId, Mutation, MutationAction, MutationStatus, PendingMutation};

const SELECT_PENDING: &str = "SELECT id, action, data_json, timestamp_ms, status, attempts, last_error \
     FROM pending_actions";

impl LocalStore {
    /// Appends a mutation to the queue and returns its local id.
    ///
    /// The timestamp never goes backwards relative to earlier entries, even
    /// if the wall clock does.
    pub fn enqueue_mutation(&self, mutation: &Mutation) -> Option<i64> {
        let result = self.with_transaction(|conn| {
            let data_json = mutation.data_json()?;
            let last_ms = meta::read(conn, LAST_ENQUEUE_KEY)?
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0);
            let timestamp_ms = Utc::now().timestamp_millis().max(last_ms);

            let id: i64 =
                conn.query_row("SELECT nextval('pending_actions_seq')", [], |row| row.get(0))?;
            conn.execute(
                "INSERT INTO pending_actions (id, action, data_json, timestamp_ms, status, attempts) \
                 VALUES (?, ?, ?, ?, 'pending', 0)",
                params![id, mutation.action().as_str(), data_json, timestamp_ms],
            )?;
            meta::write(conn, LAST_ENQUEUE_KEY, &timestamp_ms.to_string())?;
            Ok(Some(id))
        });
        let id = degrade("add pending action to offline storage", result, None);
        if let Some(id) = id {
            debug!(
                "queued {} for event {} as pending action {id}",
                mutation.action(),
                mutation.target_id()
            );
        }
        id
    }

    /// All queue entries (pending and parked) in insertion order.
    pub fn list_pending(&self) -> Vec<PendingMutation> {
        degrade(
            "get pending actions from offline storage",
            self.with_conn(|conn| query_pending(conn, &format!("{SELECT_PENDING} ORDER BY id"), None)),
            Vec::new(),
        )
    }

    /// Looks up a single queue entry.
    pub fn get_pending(&self, id: i64) -> Option<PendingMutation> {
        let result = self.with_conn(|conn| {
            let mut rows = query_pending(conn, &format!("{SELECT_PENDING} WHERE id = ?"), Some(id))?;
            Ok(rows.pop())
        });
        degrade(&format!("get pending action {id}"), result, None)
    }

    /// Number of queue entries, parked ones included.
    pub fn pending_count(&self) -> usize {
        let result = self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM pending_actions", [], |row| row.get(0))?;
            Ok(usize::try_from(count).unwrap_or(0))
        });
        degrade("count pending actions", result, 0)
    }

    /// Deletes one queue entry.
    pub fn remove_pending(&self, id: i64) -> bool {
        let result = self.with_conn(|conn| {
            conn.execute("DELETE FROM pending_actions WHERE id = ?", params![id])?;
            Ok(true)
        });
        degrade(&format!("delete pending action {id} from offline storage"), result, false)
    }

    /// Records a failed replay attempt. With `park`, the entry is set aside
    /// for manual resolution and skipped by later drains.
    pub fn record_failure(&self, id: i64, error: &str, park: bool) -> bool {
        let status = if park {
            MutationStatus::Parked
        } else {
            MutationStatus::Pending
        };
        let result = self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE pending_actions SET attempts = attempts + 1, last_error = ?, status = ? \
                 WHERE id = ?",
                params![error, status.as_str(), id],
            )?;
            Ok(changed > 0)
        });
        degrade(&format!("record failure for pending action {id}"), result, false)
    }

    /// Puts a parked entry back in line for the next drain.
    pub fn requeue(&self, id: i64) -> bool {
        let result = self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE pending_actions SET status = 'pending' WHERE id = ? AND status = 'parked'",
                params![id],
            )?;
            Ok(changed > 0)
        });
        degrade(&format!("requeue pending action {id}"), result, false)
    }

    /// Rewrites queued mutations targeting `old` to target `new`. Returns the
    /// number of entries changed.
    pub fn retarget_pending(&self, old: &EventId, new: &EventId) -> usize {
        let result = self.with_transaction(|conn| {
            let entries = query_pending(conn, &format!("{SELECT_PENDING} ORDER BY id"), None)?;
            let mut changed = 0;
            for mut entry in entries {
                if entry.mutation.target_id() != old {
                    continue;
                }
                entry.mutation.retarget(new.clone());
                conn.execute(
                    "UPDATE pending_actions SET data_json = ? WHERE id = ?",
                    params![entry.mutation.data_json()?, entry.id],
                )?;
                changed += 1;
            }
            Ok(changed)
        });
        degrade(&format!("retarget pending actions for event {old}"), result, 0)
    }
}

fn query_pending(
    conn: &Connection,
    sql: &str,
    id: Option<i64>,
) -> StorageResult<Vec<PendingMutation>> {
    let mut stmt = conn.prepare(sql)?;
    let map_row = |row: &duckdb::Row<'_>| -> duckdb::Result<RawPending> {
        Ok(RawPending {
            id: row.get(0)?,
            action: row.get(1)?,
            data_json: row.get(2)?,
            timestamp_ms: row.get(3)?,
            status: row.get(4)?,
            attempts: row.get(5)?,
            last_error: row.get(6)?,
        })
    };
    let rows = match id {
        Some(id) => stmt.query_map(params![id], map_row)?.collect::<Result<Vec<_>, _>>()?,
        None => stmt.query_map([], map_row)?.collect::<Result<Vec<_>, _>>()?,
    };

    let mut entries = Vec::with_capacity(rows.len());
    for raw in rows {
        let raw_id = raw.id;
        match raw.decode() {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("skipping undecodable pending action {raw_id}: {e}"),
        }
    }
    Ok(entries)
}

struct RawPending {
    id: i64,
    action: String,
    data_json: String,
    timestamp_ms: i64,
    status: String,
    attempts: i32,
    last_error: Option<String>,
}

impl RawPending {
    fn decode(self) -> StorageResult<PendingMutation> {
        let action: MutationAction = self.action.parse()?;
        let mutation = Mutation::from_parts(action, &self.data_json)?;
        Ok(PendingMutation {
            id: self.id,
            mutation,
            timestamp: DateTime::from_timestamp_millis(self.timestamp_ms).unwrap_or_default(),
            status: MutationStatus::parse_lossy(&self.status),
            attempts: u32::try_from(self.attempts).unwrap_or(0),
            last_error: self.last_error,
        })
    }
}
