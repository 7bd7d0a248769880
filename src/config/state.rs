// Application state module
// Owns the movie store and the values read on every request

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::model;
use crate::store::MovieStore;

/// Application state, shared by every connection through `Arc`
pub struct AppState {
    pub config: Config,
    pub store: MovieStore,

    /// Notified once when the server should stop accepting connections
    pub shutdown_signal: Arc<Notify>,
}

impl AppState {
    /// Create `AppState` with a store seeded according to `store.seed`
    pub fn new(config: &Config) -> Self {
        let initial = if config.store.seed {
            model::seed_movies()
        } else {
            Vec::new()
        };

        Self::with_store(config, MovieStore::new(initial, config.store.id_strategy))
    }

    /// Create `AppState` around an existing store
    pub fn with_store(config: &Config, store: MovieStore) -> Self {
        Self {
            config: config.clone(),
            store,
            shutdown_signal: Arc::new(Notify::new()),
        }
    }
}
