//! Error types for the bot logic.

use livebot_client::ClientError;
use livebot_persistence::PersistenceError;
use thiserror::Error;

use crate::reply::PendingStep;

/// Missing or invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// A step of the install or rehydrate sequence failed.
///
/// The installation state is left as it was before the attempt (or marked
/// stale, for a failed refresh).
#[derive(Debug, Error)]
pub enum InstallError {
    /// Exchanging the authorization code failed.
    #[error("failed to exchange authorization code: {0}")]
    Exchange(#[source] ClientError),

    /// Creating the bot agent failed.
    #[error("failed to create bot: {0}")]
    CreateBot(#[source] ClientError),

    /// Enabling chat routing for the bot failed.
    #[error("failed to set routing status: {0}")]
    RoutingStatus(#[source] ClientError),

    /// Exchanging the stored refresh token failed; the record is stale.
    #[error("failed to refresh access token: {0}")]
    Refresh(#[source] ClientError),

    /// Reading or writing the installation record failed.
    #[error("installation record error: {0}")]
    Persist(#[from] PersistenceError),

    /// Another install is already running.
    #[error("an installation is already in progress")]
    InProgress,

    /// The operation needs a completed installation.
    #[error("bot is not installed")]
    NotInstalled,
}

/// Delivering a reply to a chat failed.
#[derive(Debug, Error)]
#[error("failed to deliver reply to chat {chat_id}: {source}")]
pub struct ReplyError {
    /// Chat the reply was meant for.
    pub chat_id: String,
    /// Step left undone after earlier steps were delivered. `None` means
    /// nothing reached the visitor.
    pub pending: Option<PendingStep>,
    /// Underlying platform error.
    #[source]
    pub source: ClientError,
}

impl ReplyError {
    /// Creates a delivery error for a reply that sent nothing.
    pub fn new(chat_id: impl Into<String>, source: ClientError) -> Self {
        Self {
            chat_id: chat_id.into(),
            pending: None,
            source,
        }
    }

    /// Marks the step a retry has to resume from.
    pub fn with_pending(mut self, step: PendingStep) -> Self {
        self.pending = Some(step);
        self
    }

    /// Whether the platform rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.source.is_unauthorized()
    }
}

/// An inbound webhook body could not be decoded.
#[derive(Debug, Error)]
#[error("malformed {what}: {source}")]
pub struct DecodeError {
    /// Which part of the delivery was malformed.
    pub what: &'static str,
    /// Underlying parse error.
    #[source]
    pub source: serde_json::Error,
}

impl DecodeError {
    /// Creates a decode error for `what`.
    pub fn new(what: &'static str, source: serde_json::Error) -> Self {
        Self { what, source }
    }
}
