//! Inbound webhook payloads.
//!
//! The platform wraps every webhook in a [`WebhookEnvelope`] whose `payload`
//! shape depends on `action`. Payloads are kept as raw JSON until the action
//! is known.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

/// Kind of webhook delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAction {
    /// A visitor sent an event (message, quick-reply selection) in a chat.
    IncomingEvent,
    /// A new chat was started.
    IncomingChat,
    /// Any webhook kind this bot does not handle.
    Other(String),
}

impl WebhookAction {
    /// Returns the wire name of the action.
    pub fn as_str(&self) -> &str {
        match self {
            WebhookAction::IncomingEvent => "incoming_event",
            WebhookAction::IncomingChat => "incoming_chat",
            WebhookAction::Other(name) => name,
        }
    }
}

impl From<&str> for WebhookAction {
    fn from(s: &str) -> Self {
        match s {
            "incoming_event" => WebhookAction::IncomingEvent,
            "incoming_chat" => WebhookAction::IncomingChat,
            other => WebhookAction::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for WebhookAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WebhookAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WebhookAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(WebhookAction::from(s.as_str()))
    }
}

/// Outer shape of every webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    /// Which kind of webhook this is.
    pub action: WebhookAction,

    /// Action-specific payload, decoded later.
    pub payload: Box<RawValue>,
}

impl WebhookEnvelope {
    /// Decodes the payload into the type matching this envelope's action.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(self.payload.get())
    }
}

/// Payload of an `incoming_event` webhook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomingChatEvent {
    /// Chat the event belongs to.
    #[serde(deserialize_with = "non_empty_id")]
    pub chat_id: String,

    /// Thread within the chat.
    #[serde(default)]
    pub thread_id: String,

    /// The event itself.
    #[serde(default)]
    pub event: RichMessageEvent,
}

/// An event sent by a visitor, optionally carrying a quick-reply postback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RichMessageEvent {
    /// Free text of the message, if any.
    #[serde(default)]
    pub text: String,

    /// Event type as reported by the platform.
    #[serde(default, rename = "type")]
    pub kind: String,

    /// Selected quick-reply option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postback: Option<Postback>,
}

impl RichMessageEvent {
    /// Returns the postback id, if the visitor picked a quick-reply option.
    pub fn postback_id(&self) -> Option<&str> {
        self.postback.as_ref().map(|p| p.id.as_str())
    }
}

/// Machine-readable id attached to a rich-message button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Postback {
    /// Postback identifier.
    #[serde(default)]
    pub id: String,
}

/// Payload of an `incoming_chat` webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingChatOpened {
    /// The chat that was opened.
    pub chat: Chat,
}

/// Minimal chat reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Chat identifier.
    #[serde(deserialize_with = "non_empty_id")]
    pub id: String,
}

// A reply addressed to an empty chat id can never be delivered.
fn non_empty_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = String::deserialize(deserializer)?;
    if id.trim().is_empty() {
        return Err(serde::de::Error::custom("chat id must not be empty"));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!(WebhookAction::from("incoming_event"), WebhookAction::IncomingEvent);
        assert_eq!(WebhookAction::from("incoming_chat"), WebhookAction::IncomingChat);
        assert_eq!(
            WebhookAction::from("chat_deactivated"),
            WebhookAction::Other("chat_deactivated".into())
        );
    }

    #[test]
    fn test_envelope_incoming_chat() {
        let body = r#"{"action":"incoming_chat","payload":{"chat":{"id":"C1"}}}"#;
        let envelope: WebhookEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.action, WebhookAction::IncomingChat);

        let opened: IncomingChatOpened = envelope.decode_payload().unwrap();
        assert_eq!(opened.chat.id, "C1");
    }

    #[test]
    fn test_envelope_incoming_event_with_postback() {
        let body = r#"{
            "action": "incoming_event",
            "payload": {
                "chat_id": "C2",
                "thread_id": "T1",
                "event": {"type": "rich_message_postback", "postback": {"id": "just_browsing"}}
            }
        }"#;
        let envelope: WebhookEnvelope = serde_json::from_str(body).unwrap();
        let event: IncomingChatEvent = envelope.decode_payload().unwrap();

        assert_eq!(event.chat_id, "C2");
        assert_eq!(event.thread_id, "T1");
        assert_eq!(event.event.kind, "rich_message_postback");
        assert_eq!(event.event.postback_id(), Some("just_browsing"));
    }

    #[test]
    fn test_plain_message_has_no_postback() {
        let payload = r#"{"chat_id":"C3","event":{"type":"message","text":"hi"}}"#;
        let event: IncomingChatEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.event.text, "hi");
        assert!(event.event.postback_id().is_none());
    }

    #[test]
    fn test_event_payload_requires_chat_id() {
        let missing = r#"{"event":{"postback":{"id":"just_browsing"}}}"#;
        assert!(serde_json::from_str::<IncomingChatEvent>(missing).is_err());

        let empty = r#"{"chat_id":" ","event":{"postback":{"id":"just_browsing"}}}"#;
        assert!(serde_json::from_str::<IncomingChatEvent>(empty).is_err());
    }

    #[test]
    fn test_opened_payload_empty_chat_id_fails() {
        let result = serde_json::from_str::<IncomingChatOpened>(r#"{"chat":{"id":""}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_opened_payload_missing_chat_fails() {
        let result = serde_json::from_str::<IncomingChatOpened>(r#"{"foo":1}"#);
        assert!(result.is_err());
    }
}
