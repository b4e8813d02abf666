//! Process-local event service.
//!
//! Stands in for the real backend in tests and offline demos. Besides the
//! collection itself it can simulate latency, a full outage
//! ([`set_reachable`](InMemoryEventService::set_reachable)) and per-event
//! write failures, and it records every call it receives.

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::seed::seed_events;
use crate::service::EventService;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use unievents_model::{AdminQuery, DeleteAck, Event, EventId, EventPage, EventQuery};

/// A call received by the in-memory service.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    List(EventQuery),
    ListAdmin(AdminQuery),
    Get(EventId),
    Create(Event),
    Update(EventId, Event),
    Delete(EventId),
    Duplicate(EventId),
}

/// In-memory implementation of [`EventService`].
pub struct InMemoryEventService {
    events: RwLock<Vec<Event>>,
    latency: Duration,
    reachable: AtomicBool,
    server_assigned_ids: bool,
    failing_ids: Mutex<HashSet<EventId>>,
    calls: Mutex<Vec<RemoteCall>>,
}

impl InMemoryEventService {
    /// An empty collection.
    pub fn new() -> Self {
        Self::with_events(Vec::new())
    }

    /// The sample campus dataset.
    pub fn seeded() -> Self {
        Self::with_events(seed_events())
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
            latency: Duration::ZERO,
            reachable: AtomicBool::new(true),
            server_assigned_ids: false,
            failing_ids: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Applies the simulated latency from `config`.
    pub fn with_config(mut self, config: &RemoteConfig) -> Self {
        self.latency = config.simulated_latency();
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Ignore client-supplied ids on create and always mint a new one.
    pub fn with_server_assigned_ids(mut self) -> Self {
        self.server_assigned_ids = true;
        self
    }

    /// Simulates an outage: every call fails with `Unreachable` while false.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Makes writes targeting `id` fail with `Unreachable` until cleared.
    pub fn fail_writes_for(&self, id: impl Into<EventId>) {
        lock(&self.failing_ids).insert(id.into());
    }

    pub fn clear_failures(&self) {
        lock(&self.failing_ids).clear();
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        lock(&self.calls).clone()
    }

    /// Only the write calls (create/update/delete/duplicate), in order.
    pub fn write_calls(&self) -> Vec<RemoteCall> {
        self.calls()
            .into_iter()
            .filter(|c| {
                !matches!(
                    c,
                    RemoteCall::List(_) | RemoteCall::ListAdmin(_) | RemoteCall::Get(_)
                )
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Snapshot of the whole collection.
    pub async fn all_events(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }

    async fn enter(&self, call: RemoteCall) -> RemoteResult<()> {
        let target = match &call {
            RemoteCall::Create(event) => Some(event.id.clone()),
            RemoteCall::Update(id, _) | RemoteCall::Delete(id) | RemoteCall::Duplicate(id) => {
                Some(id.clone())
            }
            _ => None,
        };
        lock(&self.calls).push(call);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(RemoteError::Unreachable("network is offline".to_string()));
        }
        if let Some(id) = target {
            if lock(&self.failing_ids).contains(&id) {
                return Err(RemoteError::Unreachable(format!("write to event {id} timed out")));
            }
        }
        Ok(())
    }
}

impl Default for InMemoryEventService {
    fn default() -> Self {
        Self::new()
    }
}

// A poisoned bookkeeping lock only means a test panicked mid-push; the data
// is still usable.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl EventService for InMemoryEventService {
    async fn list(&self, query: &EventQuery) -> RemoteResult<EventPage> {
        self.enter(RemoteCall::List(query.clone())).await?;
        Ok(query.apply(&self.events.read().await))
    }

    async fn list_admin(&self, query: &AdminQuery) -> RemoteResult<EventPage> {
        self.enter(RemoteCall::ListAdmin(query.clone())).await?;
        Ok(query.apply(&self.events.read().await))
    }

    async fn get(&self, id: &EventId) -> RemoteResult<Option<Event>> {
        self.enter(RemoteCall::Get(id.clone())).await?;
        Ok(self.events.read().await.iter().find(|e| &e.id == id).cloned())
    }

    async fn create(&self, mut event: Event) -> RemoteResult<Event> {
        self.enter(RemoteCall::Create(event.clone())).await?;
        event.validate().map_err(|e| RemoteError::Rejected(e.to_string()))?;

        if self.server_assigned_ids || event.id.is_empty() {
            event.id = EventId::generate();
        }

        let mut events = self.events.write().await;
        // Replaying a create whose response was lost must not duplicate it.
        match events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event.clone(),
            None => events.push(event.clone()),
        }
        debug!("created event {}", event.id);
        Ok(event)
    }

    async fn update(&self, id: &EventId, mut event: Event) -> RemoteResult<Event> {
        self.enter(RemoteCall::Update(id.clone(), event.clone())).await?;
        event.id = id.clone();
        event.validate().map_err(|e| RemoteError::Rejected(e.to_string()))?;

        let mut events = self.events.write().await;
        let existing = events
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        *existing = event.clone();
        Ok(event)
    }

    async fn delete(&self, id: &EventId) -> RemoteResult<DeleteAck> {
        self.enter(RemoteCall::Delete(id.clone())).await?;

        let mut events = self.events.write().await;
        let index = events
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        events.remove(index);
        Ok(DeleteAck {
            success: true,
            id: Some(id.clone()),
        })
    }

    async fn duplicate(&self, id: &EventId) -> RemoteResult<Event> {
        self.enter(RemoteCall::Duplicate(id.clone())).await?;

        let mut events = self.events.write().await;
        let original = events
            .iter()
            .find(|e| &e.id == id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        let copy = original.duplicate(EventId::generate());
        events.push(copy.clone());
        Ok(copy)
    }
}
