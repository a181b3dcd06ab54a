use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::store::EntryStore;

/// Application state shared across all handlers and services
#[derive(Clone)]
pub struct AppState {
    /// Entry record store
    pub store: Arc<dyn EntryStore>,
    /// Single-writer lock for the mutate+renumber sequence. Held for the
    /// whole sequence, not per store call.
    pub queue_lock: Arc<Mutex<()>>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create new AppState
    pub fn new(store: Arc<dyn EntryStore>, config: AppConfig) -> Self {
        Self {
            store,
            queue_lock: Arc::new(Mutex::new(())),
            config: Arc::new(config),
        }
    }
}
