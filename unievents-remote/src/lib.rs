//! Remote event service for unievents.
//!
//! The authoritative event collection sits behind the [`EventService`]
//! trait. Two implementations ship here:
//! - [`InMemoryEventService`]: process-local collection seeded with sample
//!   data, with hooks to simulate latency, outages and failures
//! - [`HttpEventService`]: JSON client for the events REST API

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod seed;
pub mod service;

pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};
pub use http::HttpEventService;
pub use memory::{InMemoryEventService, RemoteCall};
pub use service::EventService;
