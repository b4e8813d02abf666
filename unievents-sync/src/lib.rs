//! Offline mode for unievents.
//!
//! Ties the local store, the remote event service and a connectivity signal
//! together:
//!
//! - [`OfflineCoordinator`]: routes reads and writes by connectivity and
//!   reports the user-facing state
//! - [`SyncEngine`]: replays queued writes in FIFO order
//! - [`OfflineInitializer`]: seeds and refreshes the event cache
//! - [`ConnectivityMonitor`]: online/offline flag with change notification

pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod initializer;
mod logging;
pub mod status;

pub use config::SyncConfig;
pub use connectivity::ConnectivityMonitor;
pub use coordinator::{CoordinatorCommand, CoordinatorHandle, OfflineCoordinator};
pub use engine::{EntryOutcome, EntryStatus, SyncEngine, SyncReport};
pub use error::{SyncError, SyncResult};
pub use initializer::{InitOutcome, OfflineInitializer};
pub use logging::init_tracing;
pub use status::{ConnectivityState, StatusBanner};
