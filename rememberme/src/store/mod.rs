//! Data-access abstractions and implementations
//!
//! - **RestStore**: the hosted data service (PostgREST, object storage, auth)
//! - **InMemoryStore**: process-local tables for tests, demos and offline use

pub mod auth;
pub mod errors;
pub mod memory;
pub mod rest;
pub mod traits;

use std::sync::Arc;

pub use errors::{StoreError, StoreResult};
pub use memory::{Fixture, FixtureAccount, InMemoryStore};
pub use rest::RestStore;
pub use traits::{
    AuthClient, BaseStore, DataStore, FamilyStore, FileStore, MemoryStore, PatientStore,
    VideoStore,
};

use crate::config::{DataBackend, DataConfig};
use crate::session::Session;

async fn create_memory_store(config: &DataConfig) -> StoreResult<InMemoryStore> {
    match &config.fixture {
        Some(path) => InMemoryStore::load_fixture(path).await,
        None => Ok(InMemoryStore::new()),
    }
}

/// Create the configured data store, acting as the session's user
pub async fn create_data_store(
    config: &DataConfig,
    session: &Session,
) -> StoreResult<Arc<dyn DataStore>> {
    let store: Arc<dyn DataStore> = match config.backend {
        DataBackend::Rest => {
            let store = RestStore::new(config)?;
            match &session.access_token {
                Some(token) => Arc::new(store.with_access_token(token.clone())),
                None => Arc::new(store),
            }
        }
        DataBackend::Memory => Arc::new(create_memory_store(config).await?),
    };

    tracing::debug!(store = %store.describe(), "Data store ready");
    Ok(store)
}

/// Create the configured auth client
pub async fn create_auth_client(config: &DataConfig) -> StoreResult<Arc<dyn AuthClient>> {
    Ok(match config.backend {
        DataBackend::Rest => Arc::new(RestStore::new(config)?),
        DataBackend::Memory => Arc::new(create_memory_store(config).await?),
    })
}
