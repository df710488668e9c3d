use std::sync::Arc;

use tracing::info;

use crate::config::ServerConfig;
use crate::domain::resumption::ResumptionResolver;
use crate::error::AppError;
use crate::services::sessions::SessionService;
use crate::services::sync::{GameStore, InMemoryGameStore};
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    config: ServerConfig,
    store: Option<Arc<dyn GameStore>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            store: None,
        }
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn GameStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Needs a running tokio runtime: the sync writer task starts here.
    pub async fn build(self) -> Result<AppState, AppError> {
        if self.config.charge.tick.is_zero() {
            return Err(AppError::config("charge tick must be positive"));
        }
        let store = match self.store {
            Some(store) => store,
            None => {
                info!("no document store configured; using the in-memory store");
                Arc::new(InMemoryGameStore::new())
            }
        };
        let sessions = Arc::new(SessionService::new(
            store,
            self.config.charge,
            ResumptionResolver::new(self.config.resume_grace),
        ));
        Ok(AppState::new(sessions, self.config))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
