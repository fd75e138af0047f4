//! OAuth token and installation types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tokens returned by the platform's OAuth token endpoint.
///
/// The access token is short-lived and only ever held in memory. The refresh
/// token is long-lived and ends up in the [`InstallationRecord`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    /// Bearer token used for authenticated API calls.
    pub access_token: String,

    /// Token that can be exchanged for a new access token.
    pub refresh_token: String,

    /// Lifetime of the access token in seconds, when the platform reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl TokenDetails {
    /// Creates token details without an expiry.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_in: None,
        }
    }
}

// Tokens never show up in logs.
impl std::fmt::Debug for TokenDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDetails")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Durable record of a completed installation.
///
/// Written once per install and loaded on every process start. If the
/// refresh token can no longer be exchanged the record is stale and a fresh
/// install is required.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationRecord {
    /// Long-lived OAuth refresh token.
    pub refresh_token: String,

    /// Identifier of the bot agent created during install.
    pub bot_id: String,

    /// When the installation completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<DateTime<Utc>>,
}

impl InstallationRecord {
    /// Creates a record stamped with the current time.
    pub fn new(refresh_token: impl Into<String>, bot_id: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            bot_id: bot_id.into(),
            installed_at: Some(Utc::now()),
        }
    }

    /// Returns a copy of this record carrying a different refresh token.
    pub fn with_refresh_token(&self, refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            bot_id: self.bot_id.clone(),
            installed_at: self.installed_at,
        }
    }
}

impl std::fmt::Debug for InstallationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationRecord")
            .field("refresh_token", &"<redacted>")
            .field("bot_id", &self.bot_id)
            .field("installed_at", &self.installed_at)
            .finish()
    }
}
