//! Offline coordinator.
//!
//! Routes reads and writes based on connectivity:
//! - Offline: writes are queued and applied optimistically to the local
//!   store; reads come from the local store.
//! - Online with queued writes: the queue is drained on reconnect (or via
//!   `sync_now`); partial failures keep it in this state.
//! - Online and clean: writes go to the remote service and the stored result
//!   is cached locally.
//!
//! [`OfflineCoordinator::spawn`] starts a background task that drains the
//! queue once on every offline-to-online transition and serves commands
//! from a [`CoordinatorHandle`]. Transitions that land while the task is
//! busy are coalesced into a single drain.

use crate::config::SyncConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::engine::{SyncEngine, SyncReport};
use crate::error::{SyncError, SyncResult};
use crate::initializer::{InitOutcome, OfflineInitializer};
use crate::status::{ConnectivityState, StatusBanner};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use unievents_model::{AdminQuery, Event, EventDraft, EventId, EventPage, EventQuery, Mutation};
use unievents_remote::{EventService, RemoteError};
use unievents_storage::LocalStore;

/// Commands accepted by the background task.
#[derive(Debug)]
pub enum CoordinatorCommand {
    SyncNow {
        reply: oneshot::Sender<SyncResult<SyncReport>>,
    },
    Stop,
}

/// Handle for sending commands to a spawned coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    command_tx: mpsc::Sender<CoordinatorCommand>,
}

impl CoordinatorHandle {
    /// Asks the background task to drain the queue and waits for the report.
    pub async fn sync_now(&self) -> SyncResult<SyncReport> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(CoordinatorCommand::SyncNow { reply })
            .await
            .map_err(|_| SyncError::ChannelClosed)?;
        rx.await.map_err(|_| SyncError::ChannelClosed)?
    }

    pub async fn stop(&self) -> SyncResult<()> {
        self.command_tx
            .send(CoordinatorCommand::Stop)
            .await
            .map_err(|_| SyncError::ChannelClosed)
    }
}

/// Entry point for the offline mode.
pub struct OfflineCoordinator {
    store: LocalStore,
    service: Arc<dyn EventService>,
    engine: SyncEngine,
    initializer: OfflineInitializer,
    connectivity: ConnectivityMonitor,
    reports: broadcast::Sender<SyncReport>,
}

impl OfflineCoordinator {
    pub fn new(
        store: LocalStore,
        service: Arc<dyn EventService>,
        connectivity: ConnectivityMonitor,
        config: &SyncConfig,
    ) -> Self {
        let engine = SyncEngine::new(store.clone(), service.clone(), config);
        let initializer = OfflineInitializer::new(store.clone(), service.clone(), config);
        let (reports, _) = broadcast::channel(16);
        Self {
            store,
            service,
            engine,
            initializer,
            connectivity,
            reports,
        }
    }

    /// Validates `config` and opens the local store it names. A store that
    /// fails to open leaves the coordinator running without a cache.
    pub fn from_config(
        config: &SyncConfig,
        service: Arc<dyn EventService>,
        connectivity: ConnectivityMonitor,
    ) -> SyncResult<Self> {
        config.validate()?;
        let store = LocalStore::open_or_unavailable(config.db_path.as_deref());
        Ok(Self::new(store, service, connectivity, config))
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    /// Receives a report for every drain the coordinator runs.
    pub fn subscribe_reports(&self) -> broadcast::Receiver<SyncReport> {
        self.reports.subscribe()
    }

    pub fn connectivity_state(&self) -> ConnectivityState {
        if !self.connectivity.is_online() {
            ConnectivityState::Offline
        } else if self.store.pending_count() > 0 {
            ConnectivityState::OnlinePending
        } else {
            ConnectivityState::OnlineClean
        }
    }

    pub fn banner(&self) -> StatusBanner {
        let pending = self.store.pending_count();
        StatusBanner::from_state(
            self.connectivity_state(),
            self.store.has_offline_data(),
            pending,
        )
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Creates an event under a freshly generated id.
    ///
    /// Offline (or on a transient remote failure) the event is queued and
    /// cached locally; the returned record then carries the local id, which
    /// the server may replace on sync.
    pub async fn create_event(&self, draft: EventDraft) -> SyncResult<Event> {
        let event = draft.into_event(EventId::generate());
        event.validate()?;

        if self.connectivity.is_online() {
            match self.service.create(event.clone()).await {
                Ok(created) => {
                    self.store.put(&created);
                    return Ok(created);
                }
                Err(e) => self.fall_back(e, "create")?,
            }
        }
        self.queue(Mutation::Create(event.clone()))?;
        self.store.put(&event);
        Ok(event)
    }

    pub async fn update_event(&self, event: Event) -> SyncResult<Event> {
        event.validate()?;

        if self.connectivity.is_online() {
            match self.service.update(&event.id, event.clone()).await {
                Ok(updated) => {
                    self.store.put(&updated);
                    return Ok(updated);
                }
                Err(e) => self.fall_back(e, "update")?,
            }
        }
        self.queue(Mutation::Update(event.clone()))?;
        self.store.put(&event);
        Ok(event)
    }

    pub async fn delete_event(&self, id: &EventId) -> SyncResult<()> {
        if self.connectivity.is_online() {
            match self.service.delete(id).await {
                Ok(_) => {
                    self.store.remove_event(id);
                    return Ok(());
                }
                Err(e) => self.fall_back(e, "delete")?,
            }
        }
        self.queue(Mutation::Delete { id: id.clone() })?;
        self.store.remove_event(id);
        Ok(())
    }

    /// Copies an event on the server. Not available offline.
    pub async fn duplicate_event(&self, id: &EventId) -> SyncResult<Event> {
        if !self.connectivity.is_online() {
            return Err(SyncError::Offline("duplicating an event".to_string()));
        }
        let copy = self.service.duplicate(id).await?;
        self.store.put(&copy);
        Ok(copy)
    }

    /// Terminal errors go back to the caller; anything else means the write
    /// should be queued instead.
    fn fall_back(&self, error: RemoteError, op: &str) -> SyncResult<()> {
        if error.is_terminal() {
            return Err(error.into());
        }
        warn!("remote {op} failed, queueing for later: {error}");
        Ok(())
    }

    fn queue(&self, mutation: Mutation) -> SyncResult<i64> {
        self.store.enqueue_mutation(&mutation).ok_or_else(|| {
            SyncError::Storage(format!(
                "failed to queue {} for event {}",
                mutation.action(),
                mutation.target_id()
            ))
        })
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Public listing. Served by the remote service when reachable (and
    /// cached), otherwise from the local store.
    ///
    /// Records with a queued write keep their local version in the cache
    /// until the queue drains.
    pub async fn events(&self, query: &EventQuery) -> EventPage {
        if self.connectivity.is_online() {
            match self.service.list(query).await {
                Ok(page) => {
                    let pending = self.pending_targets();
                    for event in page.events.iter().filter(|e| !pending.contains(&e.id)) {
                        self.store.put(event);
                    }
                    return page;
                }
                Err(e) => warn!("listing from cache, remote failed: {e}"),
            }
        }
        query.apply(&self.store.get_all())
    }

    /// Admin listing, drafts included. Same fallback rules as [`events`](Self::events).
    pub async fn admin_events(&self, query: &AdminQuery) -> EventPage {
        if self.connectivity.is_online() {
            match self.service.list_admin(query).await {
                Ok(page) => return page,
                Err(e) => warn!("admin listing from cache, remote failed: {e}"),
            }
        }
        query.apply(&self.store.get_all())
    }

    pub async fn event(&self, id: &EventId) -> Option<Event> {
        if self.connectivity.is_online() {
            match self.service.get(id).await {
                Ok(Some(event)) => {
                    if !self.pending_targets().contains(&event.id) {
                        self.store.put(&event);
                    }
                    return Some(event);
                }
                Ok(None) => return None,
                Err(e) => warn!("reading event {id} from cache, remote failed: {e}"),
            }
        }
        self.store.get_by_id(id)
    }

    fn pending_targets(&self) -> HashSet<EventId> {
        self.store
            .list_pending()
            .into_iter()
            .map(|entry| entry.mutation.target_id().clone())
            .collect()
    }

    /// Cached events on `date`, for the calendar view.
    pub fn events_on(&self, date: NaiveDate) -> Vec<Event> {
        self.store.get_by_date(date)
    }

    // ── Sync ────────────────────────────────────────────────────────

    /// Drains the queue now.
    pub async fn sync_now(&self) -> SyncResult<SyncReport> {
        if !self.connectivity.is_online() {
            return Err(SyncError::Offline("syncing pending actions".to_string()));
        }
        let report = self.engine.sync_pending_actions().await;
        let _ = self.reports.send(report.clone());
        Ok(report)
    }

    /// Seeds the cache if it is empty or stale. Returns `None` when nothing
    /// needed doing or the device is offline.
    pub async fn initialize(&self) -> Option<InitOutcome> {
        if !self.connectivity.is_online() {
            debug!("offline, skipping cache initialization");
            return None;
        }
        let outcome = self.initializer.initialize_if_needed().await;
        if let Some(InitOutcome::Failed { error }) = &outcome {
            warn!("failed to initialize offline data: {error}");
        }
        outcome
    }

    // ── Background task ─────────────────────────────────────────────

    /// Starts the background task. It runs until [`CoordinatorHandle::stop`]
    /// or until every handle is dropped.
    pub fn spawn(self: Arc<Self>) -> (CoordinatorHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let mut online_rx = self.connectivity.subscribe();
        // Read before spawning so a transition racing the task start is
        // still seen as an edge.
        let was_online = *online_rx.borrow_and_update();
        let task = tokio::spawn(async move { self.run(was_online, online_rx, command_rx).await });
        (CoordinatorHandle { command_tx }, task)
    }

    async fn run(
        &self,
        mut was_online: bool,
        mut online_rx: watch::Receiver<bool>,
        mut command_rx: mpsc::Receiver<CoordinatorCommand>,
    ) {
        info!("offline coordinator started (online: {was_online})");

        loop {
            tokio::select! {
                changed = online_rx.changed() => {
                    if changed.is_err() {
                        info!("connectivity monitor closed, stopping coordinator");
                        break;
                    }
                    // The monitor only publishes real changes, so seeing
                    // `true` here means at least one offline-to-online edge
                    // happened since the last wake, even if an
                    // online-offline-online flap collapsed into one value.
                    let online = *online_rx.borrow_and_update();
                    if online {
                        info!("back online, syncing pending actions");
                        let report = self.engine.sync_pending_actions().await;
                        let _ = self.reports.send(report);
                    } else if was_online {
                        info!("connection lost, queueing writes locally");
                    }
                    was_online = online;
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(CoordinatorCommand::SyncNow { reply }) => {
                            let _ = reply.send(self.sync_now().await);
                        }
                        Some(CoordinatorCommand::Stop) => {
                            info!("offline coordinator stopping");
                            break;
                        }
                        None => {
                            info!("command channel closed, stopping coordinator");
                            break;
                        }
                    }
                }
            }
        }

        info!("offline coordinator stopped");
    }
}
