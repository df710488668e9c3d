use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::charge_ticker::ChargeTicker;
use crate::services::sessions::SessionService;

/// Application state containing shared resources
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live sessions and their sync relay
    pub sessions: Arc<SessionService>,
    /// Tick tasks for held charges
    pub ticker: Arc<ChargeTicker>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(sessions: Arc<SessionService>, config: ServerConfig) -> Self {
        let ticker = Arc::new(ChargeTicker::new(Arc::clone(&sessions)));
        Self {
            sessions,
            ticker,
            config,
        }
    }
}
