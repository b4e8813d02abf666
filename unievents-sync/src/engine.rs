//! Replays queued mutations against the remote event service.
//!
//! A drain walks the pending queue in insertion order and dispatches each
//! entry: `create` → `create`, `update` → `update(id)`, `delete` →
//! `delete(id)`. Successful entries are removed; failed ones stay queued
//! with the error recorded. Terminal failures (target gone, payload refused)
//! park the entry so later drains skip it until someone requeues or drops
//! it. A failure never stops the drain.

use crate::config::SyncConfig;
use crate::initializer::OfflineInitializer;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use unievents_model::{EventId, Mutation, MutationAction, PendingMutation};
use unievents_remote::{EventService, RemoteResult};
use unievents_storage::LocalStore;

const NOTHING_TO_SYNC: &str = "No pending actions to sync";

/// What happened to one queue entry during a drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// Accepted by the server and removed from the queue.
    Synced,
    /// Rejected or unreachable; still queued. `terminal` entries were parked.
    Failed { error: String, terminal: bool },
    /// Parked by an earlier drain and not retried.
    Parked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    /// Queue entry id.
    pub id: i64,
    pub action: MutationAction,
    pub target: EventId,
    pub status: EntryStatus,
}

impl EntryOutcome {
    pub fn is_synced(&self) -> bool {
        self.status == EntryStatus::Synced
    }
}

/// Summary of one drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// True iff every entry was synced (vacuously true for an empty queue).
    pub success: bool,
    pub results: Vec<EntryOutcome>,
    pub message: String,
}

impl SyncReport {
    fn empty() -> Self {
        Self {
            success: true,
            results: Vec::new(),
            message: NOTHING_TO_SYNC.to_string(),
        }
    }

    fn from_results(results: Vec<EntryOutcome>) -> Self {
        let total = results.len();
        let synced = results.iter().filter(|r| r.is_synced()).count();
        let success = synced == total;
        let message = if success {
            format!("Synced {synced} pending action(s)")
        } else {
            format!("{} of {total} pending action(s) failed to sync", total - synced)
        };
        Self {
            success,
            results,
            message,
        }
    }

    pub fn synced_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_synced()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.synced_count()
    }
}

/// Drains the pending queue. Concurrent drains are serialised.
pub struct SyncEngine {
    store: LocalStore,
    service: Arc<dyn EventService>,
    initializer: OfflineInitializer,
    refresh_after_drain: bool,
    run_lock: Mutex<()>,
}

impl SyncEngine {
    pub fn new(store: LocalStore, service: Arc<dyn EventService>, config: &SyncConfig) -> Self {
        let initializer = OfflineInitializer::new(store.clone(), service.clone(), config);
        Self {
            store,
            service,
            initializer,
            refresh_after_drain: config.refresh_after_drain,
            run_lock: Mutex::new(()),
        }
    }

    /// Replays every pending mutation once, in FIFO order.
    ///
    /// Never returns an error: per-entry failures are in the report.
    pub async fn sync_pending_actions(&self) -> SyncReport {
        let _guard = self.run_lock.lock().await;

        let pending = self.store.list_pending();
        if pending.is_empty() {
            return SyncReport::empty();
        }
        info!("syncing {} pending actions", pending.len());

        let mut results = Vec::with_capacity(pending.len());
        for entry in pending {
            // Entries retargeted by an earlier create in this drain must be
            // re-read to pick up the server id.
            let entry = if entry.is_parked() {
                entry
            } else {
                match self.store.get_pending(entry.id) {
                    Some(current) => current,
                    None => continue,
                }
            };
            results.push(self.replay(entry).await);
        }

        let report = SyncReport::from_results(results);
        if report.success {
            info!("{}", report.message);
            if self.refresh_after_drain {
                if let Err(e) = self.initializer.refresh_snapshot().await {
                    warn!("post-sync snapshot refresh failed: {e}");
                }
            }
        } else {
            warn!("{}", report.message);
        }
        report
    }

    async fn replay(&self, entry: PendingMutation) -> EntryOutcome {
        let mut outcome = EntryOutcome {
            id: entry.id,
            action: entry.action(),
            target: entry.mutation.target_id().clone(),
            status: EntryStatus::Parked,
        };
        if entry.is_parked() {
            debug!("skipping parked action {} ({})", entry.id, outcome.action);
            return outcome;
        }

        match self.dispatch(&entry.mutation).await {
            Ok(server_id) => {
                if let Some(server_id) = server_id.filter(|id| *id != outcome.target) {
                    self.adopt_server_id(&outcome.target, &server_id);
                }
                if !self.store.remove_pending(entry.id) {
                    error!("synced action {} could not be removed from the queue", entry.id);
                }
                debug!("synced {} for event {}", outcome.action, outcome.target);
                outcome.status = EntryStatus::Synced;
            }
            Err(e) => {
                let terminal = e.is_terminal();
                let message = e.to_string();
                if terminal {
                    warn!("parking {} for event {}: {message}", outcome.action, outcome.target);
                } else {
                    debug!("{} for event {} failed: {message}", outcome.action, outcome.target);
                }
                self.store.record_failure(entry.id, &message, terminal);
                outcome.status = EntryStatus::Failed {
                    error: message,
                    terminal,
                };
            }
        }
        outcome
    }

    /// Sends one mutation. For creates, returns the id the server stored.
    async fn dispatch(&self, mutation: &Mutation) -> RemoteResult<Option<EventId>> {
        match mutation {
            Mutation::Create(event) => {
                let created = self.service.create(event.clone()).await?;
                Ok(Some(created.id))
            }
            Mutation::Update(event) => {
                self.service.update(&event.id, event.clone()).await?;
                Ok(None)
            }
            Mutation::Delete { id } => {
                self.service.delete(id).await?;
                Ok(None)
            }
        }
    }

    fn adopt_server_id(&self, local: &EventId, server: &EventId) {
        info!("event {local} stored by the server as {server}");
        self.store.rekey_event(local, server);
        let moved = self.store.retarget_pending(local, server);
        if moved > 0 {
            debug!("retargeted {moved} queued actions to {server}");
        }
    }

    pub fn pending_count(&self) -> usize {
        self.store.pending_count()
    }
}
