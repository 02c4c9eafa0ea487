//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider lookup and its failure classification
//! - The weather store state machine with its bounded search history
//! - Durable key-value persistence for history and the last viewed city
//! - The `Dashboard` session that wires them together
//!
//! It is used by the `weather-dashboard` binary, but holds no presentation code.

pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod session;
pub mod storage;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{Config, ProviderSettings};
pub use error::{FetchError, StorageError};
pub use model::WeatherPayload;
pub use orchestrator::{Completion, FetchOutcome, Orchestrator, PendingFetch};
pub use provider::{WeatherProvider, provider_from_config};
pub use session::{Dashboard, Hydration};
pub use storage::{FileStore, HISTORY_LIMIT, KeyValueStore, MemoryStore, Persistence};
pub use store::{FetchStatus, RequestId, WeatherState, WeatherStore};
