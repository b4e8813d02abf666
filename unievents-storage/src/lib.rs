//! Offline storage for unievents.
//!
//! Provides the on-device tables the offline mode runs on, backed by DuckDB:
//!
//! - `events`: cached event records keyed by event id
//! - `pending_actions`: FIFO queue of writes awaiting the remote service
//! - `sync_meta`: small key/value table (snapshot time, enqueue clock)
//!
//! Every public `LocalStore` operation degrades to an empty/false/`None`
//! result when the database is missing or broken; callers never see a
//! storage error.

mod error;
mod events;
mod meta;
mod pending;
mod store;

pub use error::{StorageError, StorageResult};
pub use store::LocalStore;
