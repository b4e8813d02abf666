//! Cached event records.

use crate::error::StorageResult;
use crate::store::{LocalStore, degrade};
use chrono::NaiveDate;
use duckdb::{Connection, params, params_from_iter};
use unievents_model::{Event, EventId};
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

impl LocalStore {
    /// All cached events, ordered by date then id.
    pub fn get_all(&self) -> Vec<Event> {
        degrade(
            "get events from offline storage",
            self.with_conn(|conn| query_events(conn, "SELECT data_json FROM events ORDER BY date, id", &[])),
            Vec::new(),
        )
    }

    /// Looks up a cached event.
    pub fn get_by_id(&self, id: &EventId) -> Option<Event> {
        let result = self.with_conn(|conn| {
            let mut events = query_events(
                conn,
                "SELECT data_json FROM events WHERE id = ?",
                &[id.as_str()],
            )?;
            Ok(events.pop())
        });
        degrade(&format!("get event {id} from offline storage"), result, None)
    }

    /// Cached events taking place on `date`.
    pub fn get_by_date(&self, date: NaiveDate) -> Vec<Event> {
        let day = date.format(DATE_FORMAT).to_string();
        degrade(
            "get events by date from offline storage",
            self.with_conn(|conn| {
                query_events(
                    conn,
                    "SELECT data_json FROM events WHERE date = ? ORDER BY id",
                    &[day.as_str()],
                )
            }),
            Vec::new(),
        )
    }

    /// Upserts an event by id.
    pub fn put(&self, event: &Event) -> bool {
        degrade(
            "save event to offline storage",
            self.with_conn(|conn| upsert_event(conn, event)).map(|_| true),
            false,
        )
    }

    /// Deletes a cached event. Deleting an absent id still succeeds.
    pub fn remove_event(&self, id: &EventId) -> bool {
        let result = self.with_conn(|conn| {
            conn.execute("DELETE FROM events WHERE id = ?", params![id.as_str()])?;
            Ok(true)
        });
        degrade(&format!("delete event {id} from offline storage"), result, false)
    }

    /// Moves a cached record to a new id (server assigned a different id on
    /// create). Returns false if `old` was not cached.
    pub fn rekey_event(&self, old: &EventId, new: &EventId) -> bool {
        let result = self.with_transaction(|conn| {
            let mut events =
                query_events(conn, "SELECT data_json FROM events WHERE id = ?", &[old.as_str()])?;
            let Some(mut event) = events.pop() else {
                return Ok(false);
            };
            conn.execute("DELETE FROM events WHERE id = ?", params![old.as_str()])?;
            event.id = new.clone();
            upsert_event(conn, &event)?;
            Ok(true)
        });
        degrade(&format!("rekey event {old} in offline storage"), result, false)
    }

    /// Replaces the whole cached set with `events` (server snapshot).
    pub fn replace_events(&self, events: &[Event]) -> bool {
        let result = self.with_transaction(|conn| {
            // Upsert first, then drop ids missing from the snapshot. Deleting
            // and re-inserting the same key in one transaction trips DuckDB's
            // unique check.
            for event in events {
                upsert_event(conn, event)?;
            }
            if events.is_empty() {
                conn.execute("DELETE FROM events", [])?;
            } else {
                let placeholders = vec!["?"; events.len()].join(", ");
                let sql = format!("DELETE FROM events WHERE id NOT IN ({placeholders})");
                conn.execute(&sql, params_from_iter(events.iter().map(|e| e.id.as_str())))?;
            }
            Ok(true)
        });
        degrade("replace events in offline storage", result, false)
    }

    /// Returns true if at least one event is cached.
    pub fn has_offline_data(&self) -> bool {
        let result = self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
            Ok(count > 0)
        });
        degrade("count cached events", result, false)
    }
}

fn upsert_event(conn: &Connection, event: &Event) -> StorageResult<()> {
    let data_json = serde_json::to_string(event)?;
    conn.execute(
        "INSERT OR REPLACE INTO events (id, date, data_json) VALUES (?, ?, ?)",
        params![
            event.id.as_str(),
            event.date.format(DATE_FORMAT).to_string(),
            data_json,
        ],
    )?;
    Ok(())
}

/// Runs a `SELECT data_json ...` query. Rows that fail to decode are skipped.
fn query_events(conn: &Connection, sql: &str, args: &[&str]) -> StorageResult<Vec<Event>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), |row| row.get::<_, String>(0))?;

    let mut events = Vec::new();
    for raw in rows {
        let raw = raw?;
        match serde_json::from_str::<Event>(&raw) {
            Ok(event) => events.push(event),
            Err(e) => warn!("skipping undecodable cached event: {e}"),
        }
    }
    Ok(events)
}
