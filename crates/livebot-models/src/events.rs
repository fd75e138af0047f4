//! Outbound events and platform enums.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Plain text message sent to a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Event type, always `message`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Message text.
    pub text: String,
}

impl MessageEvent {
    /// Creates a plain text message event.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "message".to_string(),
            text: text.into(),
        }
    }

    /// Serializes the event into raw JSON ready for `send_event`.
    pub fn to_raw(&self) -> serde_json::Result<Box<RawValue>> {
        serde_json::value::to_raw_value(self)
    }
}

/// Availability of the bot for newly assigned chats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStatus {
    /// Bot receives new chats.
    AcceptingChats,
    /// Bot receives no new chats.
    NotAcceptingChats,
}

impl RoutingStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingStatus::AcceptingChats => "accepting_chats",
            RoutingStatus::NotAcceptingChats => "not_accepting_chats",
        }
    }
}

impl std::fmt::Display for RoutingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-authored rich message with quick-reply buttons.
///
/// Held as raw JSON so it reaches the platform exactly as authored.
#[derive(Debug, Clone)]
pub struct RichMessageTemplate(Box<RawValue>);

impl RichMessageTemplate {
    /// Parses a template from its JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let raw: Box<RawValue> = serde_json::from_str(json)?;
        Ok(Self(raw))
    }

    /// Returns the template as raw JSON.
    pub fn as_raw(&self) -> &RawValue {
        &self.0
    }
}
