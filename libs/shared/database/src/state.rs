use std::sync::Arc;

use shared_config::AppConfig;

use crate::store::RecordStore;

/// Router state shared by every cell.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: RecordStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: RecordStore) -> Self {
        Self { config: Arc::new(config), store }
    }

    pub fn from_config(config: AppConfig) -> Self {
        let store = RecordStore::from_config(&config);
        Self::new(config, store)
    }

    pub fn in_memory() -> Self {
        Self::new(AppConfig::default(), RecordStore::in_memory())
    }
}
