//! OAuth application settings.
//!
//! # Environment Variables
//!
//! Required:
//! - `CLIENT_ID`: OAuth client id of the platform app
//! - `CLIENT_SECRET`: OAuth client secret
//! - `CLIENT_REDIRECT_URI`: redirect URI registered for the app
//!
//! Optional:
//! - `LIVEBOT_BOT_NAME`: name given to the bot created on install (default: `ChatBot`)

use crate::error::ConfigError;

/// Environment variable holding the OAuth client id.
pub const CLIENT_ID_ENV: &str = "CLIENT_ID";

/// Environment variable holding the OAuth client secret.
pub const CLIENT_SECRET_ENV: &str = "CLIENT_SECRET";

/// Environment variable holding the OAuth redirect URI.
pub const CLIENT_REDIRECT_URI_ENV: &str = "CLIENT_REDIRECT_URI";

/// Environment variable overriding the bot name.
pub const BOT_NAME_ENV: &str = "LIVEBOT_BOT_NAME";

/// Name of the bot created on install unless overridden.
pub const DEFAULT_BOT_NAME: &str = "ChatBot";

/// Credentials of the OAuth app plus bot settings.
#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI registered with the platform.
    pub redirect_uri: String,
    /// Name of the bot agent created on install.
    pub bot_name: String,
}

impl BotConfig {
    /// Creates a config with the default bot name.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            bot_name: DEFAULT_BOT_NAME.to_string(),
        }
    }

    /// Sets the bot name.
    pub fn with_bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = name.into();
        self
    }

    /// Reads the config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the config through `lookup`, treating empty values as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let config = Self::new(
            get(CLIENT_ID_ENV)?,
            get(CLIENT_SECRET_ENV)?,
            get(CLIENT_REDIRECT_URI_ENV)?,
        );
        Ok(match lookup(BOT_NAME_ENV).filter(|v| !v.trim().is_empty()) {
            Some(name) => config.with_bot_name(name),
            None => config,
        })
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("bot_name", &self.bot_name)
            .finish()
    }
}
