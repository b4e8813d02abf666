//! The event service interface.

use crate::error::RemoteResult;
use async_trait::async_trait;
use unievents_model::{AdminQuery, DeleteAck, Event, EventId, EventPage, EventQuery};

/// The authoritative event collection. May be unreachable at any time.
#[async_trait]
pub trait EventService: Send + Sync {
    /// Public listing: published events only, filtered, sorted and paged.
    async fn list(&self, query: &EventQuery) -> RemoteResult<EventPage>;

    /// Admin listing: drafts included.
    async fn list_admin(&self, query: &AdminQuery) -> RemoteResult<EventPage>;

    /// Fetches one event. `Ok(None)` if it does not exist.
    async fn get(&self, id: &EventId) -> RemoteResult<Option<Event>>;

    /// Creates an event and returns it as stored. The stored id may differ
    /// from the one sent.
    async fn create(&self, event: Event) -> RemoteResult<Event>;

    /// Replaces an event. Fails with `NotFound` if `id` is absent.
    async fn update(&self, id: &EventId, event: Event) -> RemoteResult<Event>;

    /// Deletes an event. Fails with `NotFound` if `id` is absent.
    async fn delete(&self, id: &EventId) -> RemoteResult<DeleteAck>;

    /// Stores an unpublished copy of an event under a new id.
    async fn duplicate(&self, id: &EventId) -> RemoteResult<Event>;
}
