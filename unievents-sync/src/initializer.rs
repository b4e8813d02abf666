//! Seeds and refreshes the on-device event cache.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use unievents_model::{AdminQuery, Event, EventQuery};
use unievents_remote::EventService;
use unievents_storage::LocalStore;

/// Result of seeding the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Cached { count: usize },
    Failed { error: String },
}

impl InitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InitOutcome::Cached { .. })
    }
}

/// Copies events from the remote service into the [`LocalStore`].
#[derive(Clone)]
pub struct OfflineInitializer {
    store: LocalStore,
    service: Arc<dyn EventService>,
    max_age: Duration,
    max_pages: usize,
}

impl OfflineInitializer {
    pub fn new(store: LocalStore, service: Arc<dyn EventService>, config: &SyncConfig) -> Self {
        Self {
            store,
            service,
            max_age: config.snapshot_max_age(),
            max_pages: config.snapshot_max_pages.max(1),
        }
    }

    /// Caches the first page of published events (default sort).
    ///
    /// Records are upserted, so running this twice leaves one record per id.
    /// Never returns an error; failures are reported in the outcome.
    pub async fn initialize_offline_data(&self) -> InitOutcome {
        if !self.store.is_available() {
            return InitOutcome::Failed {
                error: "offline storage is not available".to_string(),
            };
        }

        let page = match self.service.list(&EventQuery::first_page()).await {
            Ok(page) => page,
            Err(e) => {
                warn!("failed to initialize offline data: {e}");
                return InitOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        if page.events.is_empty() {
            warn!("no events data available for offline caching");
            return InitOutcome::Failed {
                error: "no events data available".to_string(),
            };
        }

        let count = page.events.iter().filter(|e| self.store.put(e)).count();
        if count == 0 {
            return InitOutcome::Failed {
                error: "failed to write events to offline storage".to_string(),
            };
        }
        self.store.mark_snapshot(Utc::now());
        info!("cached {count} events for offline use");
        InitOutcome::Cached { count }
    }

    /// Runs [`initialize_offline_data`](Self::initialize_offline_data) only
    /// if the cache is empty or its snapshot is older than the configured
    /// maximum age. Returns `None` when the cache was fresh.
    pub async fn initialize_if_needed(&self) -> Option<InitOutcome> {
        if self.store.has_offline_data() && !self.is_stale() {
            debug!("offline cache is fresh, skipping initialization");
            return None;
        }
        Some(self.initialize_offline_data().await)
    }

    /// True if no snapshot was ever taken or the last one has expired.
    pub fn is_stale(&self) -> bool {
        let Some(taken) = self.store.snapshot_taken_at() else {
            return true;
        };
        Utc::now()
            .signed_duration_since(taken)
            .to_std()
            .map(|age| age > self.max_age)
            .unwrap_or(false)
    }

    /// Replaces the whole cache with the server's collection, drafts
    /// included. Returns the number of events fetched.
    ///
    /// If the collection runs past `snapshot_max_pages`, the fetched events
    /// are merged into the cache and nothing is evicted.
    pub async fn refresh_snapshot(&self) -> SyncResult<usize> {
        if !self.store.is_available() {
            return Err(SyncError::Storage(
                "offline storage is not available".to_string(),
            ));
        }

        let (events, complete) = self.fetch_all().await?;
        if complete {
            if !self.store.replace_events(&events) {
                return Err(SyncError::Storage(
                    "failed to replace cached events".to_string(),
                ));
            }
        } else {
            let failed = events.iter().filter(|e| !self.store.put(e)).count();
            if failed > 0 {
                return Err(SyncError::Storage(format!(
                    "failed to cache {failed} of {} events",
                    events.len()
                )));
            }
        }
        self.store.mark_snapshot(Utc::now());
        debug!("refreshed offline snapshot with {} events", events.len());
        Ok(events.len())
    }

    /// Walks the admin listing. The flag is false when the page limit cut
    /// the walk short.
    async fn fetch_all(&self) -> SyncResult<(Vec<Event>, bool)> {
        let mut events = Vec::new();
        for page in 1..=self.max_pages {
            let query = AdminQuery {
                page,
                ..AdminQuery::default()
            };
            let result = self.service.list_admin(&query).await?;
            events.extend(result.events);
            if page >= result.total_pages {
                return Ok((events, true));
            }
        }
        warn!(
            "snapshot truncated at {} pages; merging without evicting older entries",
            self.max_pages
        );
        Ok((events, false))
    }
}
