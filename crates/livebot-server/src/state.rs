//! Application state shared across handlers.

use std::sync::Arc;

use livebot_engine::{InstallationManager, WebhookRouter};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Installation lifecycle.
    pub installation: Arc<InstallationManager>,
    /// Webhook dispatcher.
    pub router: Arc<WebhookRouter>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        installation: Arc<InstallationManager>,
        router: WebhookRouter,
    ) -> Self {
        Self {
            config: Arc::new(config),
            installation,
            router: Arc::new(router),
        }
    }
}
