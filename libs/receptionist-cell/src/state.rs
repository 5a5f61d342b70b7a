use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::{SlotStore, SupabaseSlotStore};

use crate::services::ToolDispatcher;

/// Everything a webhook handler needs, built once at start-up.
pub struct ReceptionistState {
    pub config: Arc<AppConfig>,
    pub dispatcher: ToolDispatcher,
}

impl ReceptionistState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn SlotStore>) -> Self {
        Self {
            dispatcher: ToolDispatcher::new(&config, store),
            config,
        }
    }

    /// State backed by the hosted table store named in `config`.
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let store: Arc<dyn SlotStore> = Arc::new(SupabaseSlotStore::new(&config));
        Self::new(config, store)
    }
}
