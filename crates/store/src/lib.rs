//! Request store access for ModGuard.
//!
//! The hosted table of moderation requests is reached through the
//! [`RequestStore`] trait. Two implementations ship here:
//!
//! - [`RestStore`] talks to a PostgREST (Supabase) endpoint.
//! - [`MemoryStore`] keeps rows in process, for tests and offline use.

pub mod config;
pub mod error;
pub mod memory;
pub mod rest;
pub mod store;

use std::sync::Arc;

pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use store::RequestStore;

/// Shared handle to a request store.
pub type SharedStore = Arc<dyn RequestStore>;

/// Connect to the hosted request store described by `config`.
pub fn connect(config: StoreConfig) -> Result<SharedStore, StoreError> {
    let store = RestStore::new(config)?;
    tracing::info!(table = %store.table(), "Request store client created");
    Ok(Arc::new(store))
}
