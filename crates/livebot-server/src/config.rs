//! Server configuration and file locations.
//!
//! # Environment Variables
//!
//! - `LIVEBOT_STATE_DIR`: directory holding `installation.json` (default: `~/.livebot`)
//! - `LIVEBOT_TEMPLATE`: rich-message template file (default: `./rich_message.json`)
//! - `LIVEBOT_TOKEN_URL`: OAuth token endpoint override
//! - `LIVEBOT_API_URL`: agent API base URL override

use std::path::PathBuf;
use std::time::{Duration, Instant};

use livebot_client::transport::DEFAULT_TIMEOUT;
use livebot_client::PlatformEndpoints;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "LIVEBOT_STATE_DIR";

/// Environment variable for the template path.
pub const TEMPLATE_ENV: &str = "LIVEBOT_TEMPLATE";

/// Environment variable overriding the token endpoint.
pub const TOKEN_URL_ENV: &str = "LIVEBOT_TOKEN_URL";

/// Environment variable overriding the agent API base URL.
pub const API_URL_ENV: &str = "LIVEBOT_API_URL";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".livebot";

/// Default template file, relative to the working directory.
pub const DEFAULT_TEMPLATE: &str = "rich_message.json";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;

const ENV_FILE: &str = ".env";

/// Get the livebot state directory.
///
/// 1. `LIVEBOT_STATE_DIR` if set
/// 2. `~/.livebot` if a home directory is available
/// 3. `.livebot` in the current directory
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Env file inside the state directory, loaded before the local ones.
pub fn env_file() -> PathBuf {
    state_dir().join(ENV_FILE)
}

/// Get the rich-message template path.
pub fn template_path() -> PathBuf {
    std::env::var(TEMPLATE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_TEMPLATE))
}

/// Platform endpoints, with production defaults unless overridden.
pub fn platform_endpoints() -> PlatformEndpoints {
    endpoints_from(|key| std::env::var(key).ok())
}

fn endpoints_from<F>(lookup: F) -> PlatformEndpoints
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = PlatformEndpoints::default();
    PlatformEndpoints::new(
        lookup(TOKEN_URL_ENV).unwrap_or_else(|| defaults.token_url().to_string()),
        lookup(API_URL_ENV).unwrap_or_else(|| defaults.api_url().to_string()),
    )
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Timeout applied to every outbound platform call.
    pub request_timeout: Duration,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            request_timeout: DEFAULT_TIMEOUT,
            start_time: Instant::now(),
        }
    }

    /// Sets the outbound request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", DEFAULT_PORT)
    }
}
