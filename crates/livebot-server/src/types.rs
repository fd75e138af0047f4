//! Request and response DTOs.

use serde::{Deserialize, Serialize};

/// Query string of the OAuth install callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstallQuery {
    /// Authorization code issued by the platform.
    pub code: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Whether the bot is installed and can answer webhooks.
    pub installed: bool,
}
