//! Shared helpers for the sync integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use unievents_model::{Event, EventDraft, EventId, Mutation};
use unievents_remote::InMemoryEventService;
use unievents_storage::LocalStore;
use unievents_sync::{ConnectivityMonitor, OfflineCoordinator, SyncConfig, SyncEngine};

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
}

pub fn draft(title: &str) -> EventDraft {
    EventDraft {
        title: title.into(),
        description: "<p>Bring a laptop.</p>".into(),
        date: day(10),
        start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        location: "Library, Room 2".into(),
        organizer: "IT Services".into(),
        organizer_department: "Library".into(),
        categories: vec!["Workshop".into()],
        image: None,
        featured: false,
        published: true,
        has_map: false,
    }
}

pub fn event(id: &str, title: &str, date: NaiveDate) -> Event {
    let mut event = draft(title).into_event(EventId::from(id));
    event.date = date;
    event
}

pub fn store() -> LocalStore {
    LocalStore::open_in_memory().unwrap()
}

/// Config with the post-drain snapshot refresh switched off, so tests can
/// inspect the cache exactly as the drain left it.
pub fn no_refresh() -> SyncConfig {
    SyncConfig {
        refresh_after_drain: false,
        ..SyncConfig::default()
    }
}

pub fn engine(
    store: &LocalStore,
    service: &Arc<InMemoryEventService>,
    config: &SyncConfig,
) -> SyncEngine {
    SyncEngine::new(store.clone(), service.clone(), config)
}

pub fn coordinator(
    store: &LocalStore,
    service: &Arc<InMemoryEventService>,
    online: bool,
) -> OfflineCoordinator {
    OfflineCoordinator::new(
        store.clone(),
        service.clone(),
        ConnectivityMonitor::new(online),
        &no_refresh(),
    )
}

pub fn enqueue(store: &LocalStore, mutation: Mutation) -> i64 {
    store.enqueue_mutation(&mutation).unwrap()
}

/// Polls `check` until it returns true or two seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
