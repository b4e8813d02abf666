//! Shared types for unievents.
//!
//! - `Event` and `EventDraft`: the campus event record
//! - `EventQuery` / `AdminQuery`: listing, filtering and pagination rules
//! - `Mutation` / `PendingMutation`: writes queued while offline
//! - `category`: the fixed category catalogue

pub mod category;
mod error;
mod event;
mod mutation;
mod query;

pub use category::{Category, categories, category_by_value};
pub use error::{ModelError, ModelResult};
pub use event::{Event, EventDraft, EventId};
pub use mutation::{Mutation, MutationAction, MutationStatus, PendingMutation};
pub use query::{
    ADMIN_PAGE_SIZE, AdminQuery, DeleteAck, EventPage, EventQuery, PUBLIC_PAGE_SIZE, SortOrder,
    StatusFilter,
};
