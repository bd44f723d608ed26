//! Quarterdeck server - sea service training record verification

pub mod api;
pub mod chain;
pub mod error;
pub mod models;
pub mod registry;
pub mod session;
pub mod store;

use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState {
    pub store: store::Store,
    pub chain: chain::VerificationChain,
    pub registry: registry::PersonnelClient,
}

impl AppState {
    pub fn new(pool: SqlitePool, registry: registry::PersonnelClient) -> Arc<Self> {
        let store = store::Store::new(pool);
        let chain = chain::VerificationChain::new(store.clone());
        Arc::new(Self {
            store,
            chain,
            registry,
        })
    }
}
