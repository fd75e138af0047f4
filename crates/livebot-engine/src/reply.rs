//! Scripted replies to visitor events.

use livebot_client::PlatformClient;
use livebot_models::{MessageEvent, RichMessageEvent, RichMessageTemplate};
use tracing::{info, warn};

use crate::error::ReplyError;

/// Postback id of the "just browsing" quick reply.
pub const JUST_BROWSING: &str = "just_browsing";
/// Postback id of the "talk to an agent" quick reply.
pub const TRANSFER_TO_AGENT: &str = "transfer_to_agent";
/// Postback id of the "keep chatting" quick reply.
pub const CONTINUE_CHAT: &str = "continue_chat";

/// Reply to [`JUST_BROWSING`].
pub const JUST_BROWSING_MESSAGE: &str = "Sure, let me know if you have any questions.";
/// Acknowledgement sent before a transfer.
pub const TRANSFER_MESSAGE: &str = "Granted, you will be redirected to talk with the agent.";
/// Reply to [`CONTINUE_CHAT`].
pub const CONTINUE_CHAT_MESSAGE: &str = "Ok what would you like to talk about?";
/// Reply to free text and unknown postbacks.
pub const FALLBACK_MESSAGE: &str = "Well, sorry I'm not smart enough to help you (yet)";
/// Sent when a transfer fails.
pub const NO_AGENTS_MESSAGE: &str = "Sorry, currently no agents available";

/// Reply step still owed to the visitor after an interrupted delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingStep {
    /// Acknowledgement delivered, transfer not done.
    Transfer,
    /// Transfer failed, visitor not yet told.
    NoAgentsNotice,
}

/// What the bot answers to a postback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedReply {
    /// Text sent to the visitor.
    pub message: &'static str,
    /// Whether the chat is handed to a human agent afterwards.
    pub transfer: bool,
}

impl ScriptedReply {
    /// Looks up the reply for a postback id. Unknown, empty and absent ids get
    /// the fallback message.
    pub fn for_postback(postback_id: Option<&str>) -> Self {
        let (message, transfer) = match postback_id {
            Some(JUST_BROWSING) => (JUST_BROWSING_MESSAGE, false),
            Some(TRANSFER_TO_AGENT) => (TRANSFER_MESSAGE, true),
            Some(CONTINUE_CHAT) => (CONTINUE_CHAT_MESSAGE, false),
            _ => (FALLBACK_MESSAGE, false),
        };
        Self { message, transfer }
    }
}

/// Result of a successful [`ReplyEngine::reply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// A message was sent.
    Replied,
    /// The message was sent and the chat transferred.
    Transferred,
    /// The message was sent, the transfer failed and the visitor was told.
    TransferFailed,
}

/// Sends the template and scripted replies.
#[derive(Clone)]
pub struct ReplyEngine {
    client: PlatformClient,
    template: RichMessageTemplate,
}

impl ReplyEngine {
    pub fn new(client: PlatformClient, template: RichMessageTemplate) -> Self {
        Self { client, template }
    }

    /// Sends the rich-message template to a newly opened chat.
    pub async fn send_template(&self, chat_id: &str) -> Result<(), ReplyError> {
        self.client
            .send_event(chat_id, self.template.as_raw())
            .await
            .map_err(|e| ReplyError::new(chat_id, e))?;
        info!(chat_id, "Welcome template sent");
        Ok(())
    }

    /// Answers a visitor event using the postback table.
    ///
    /// The acknowledgement always goes out before any transfer. A failed
    /// transfer is recovered by telling the visitor no agent is available,
    /// unless the platform rejected our credentials: then the error carries
    /// [`PendingStep::Transfer`] so the caller can retry without repeating
    /// the acknowledgement.
    pub async fn reply(
        &self,
        event: &RichMessageEvent,
        chat_id: &str,
    ) -> Result<ReplyOutcome, ReplyError> {
        let scripted = ScriptedReply::for_postback(event.postback_id());
        self.send_text(chat_id, scripted.message).await?;

        if !scripted.transfer {
            return Ok(ReplyOutcome::Replied);
        }
        self.transfer(chat_id).await
    }

    /// Continues an interrupted reply from `step`.
    pub async fn resume(
        &self,
        step: PendingStep,
        chat_id: &str,
    ) -> Result<ReplyOutcome, ReplyError> {
        match step {
            PendingStep::Transfer => self.transfer(chat_id).await,
            PendingStep::NoAgentsNotice => self.notify_no_agents(chat_id).await,
        }
    }

    async fn transfer(&self, chat_id: &str) -> Result<ReplyOutcome, ReplyError> {
        match self.client.transfer_chat(chat_id).await {
            Ok(()) => {
                info!(chat_id, "Chat transferred to an agent");
                Ok(ReplyOutcome::Transferred)
            }
            Err(e) if e.is_unauthorized() => {
                Err(ReplyError::new(chat_id, e).with_pending(PendingStep::Transfer))
            }
            Err(e) => {
                warn!(chat_id, error = %e, "Transfer failed");
                self.notify_no_agents(chat_id).await
            }
        }
    }

    async fn notify_no_agents(&self, chat_id: &str) -> Result<ReplyOutcome, ReplyError> {
        self.send_text(chat_id, NO_AGENTS_MESSAGE)
            .await
            .map_err(|e| e.with_pending(PendingStep::NoAgentsNotice))?;
        Ok(ReplyOutcome::TransferFailed)
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), ReplyError> {
        let event = MessageEvent::text(text)
            .to_raw()
            .map_err(|e| ReplyError::new(chat_id, e.into()))?;
        self.client
            .send_event(chat_id, &event)
            .await
            .map_err(|e| ReplyError::new(chat_id, e))
    }
}

impl std::fmt::Debug for ReplyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyEngine")
            .field("template", &self.template)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use livebot_client::testing::RecordingTransport;
    use livebot_client::{AuthContext, AuthHeaders, Endpoint, PlatformEndpoints};
    use livebot_models::Postback;
    use serde_json::json;

    fn engine() -> (Arc<RecordingTransport>, ReplyEngine) {
        let transport = Arc::new(RecordingTransport::new());
        let auth = Arc::new(AuthContext::with_headers(
            AuthHeaders::new("at").with_author_id("bot-1"),
        ));
        let client = PlatformClient::new(
            transport.clone(),
            PlatformEndpoints::new("http://sso/v2/token", "http://api/v3.5"),
            auth,
        );
        let template =
            RichMessageTemplate::from_json(r#"{"type":"rich_message","elements":[]}"#).unwrap();
        (transport, ReplyEngine::new(client, template))
    }

    fn postback(id: &str) -> RichMessageEvent {
        RichMessageEvent {
            postback: Some(Postback { id: id.to_string() }),
            ..Default::default()
        }
    }

    fn text_event(text: &str) -> serde_json::Value {
        json!({"type": "message", "text": text})
    }

    #[test]
    fn test_decision_table() {
        assert_eq!(
            ScriptedReply::for_postback(Some("just_browsing")),
            ScriptedReply {
                message: JUST_BROWSING_MESSAGE,
                transfer: false
            }
        );
        assert!(ScriptedReply::for_postback(Some("transfer_to_agent")).transfer);
        assert_eq!(
            ScriptedReply::for_postback(Some("continue_chat")).message,
            CONTINUE_CHAT_MESSAGE
        );
        for id in [None, Some(""), Some("Just_Browsing"), Some("something_else")] {
            assert_eq!(
                ScriptedReply::for_postback(id),
                ScriptedReply {
                    message: FALLBACK_MESSAGE,
                    transfer: false
                }
            );
        }
    }

    #[tokio::test]
    async fn test_send_template_verbatim() {
        let (transport, engine) = engine();
        engine.send_template("C1").await.unwrap();

        let body = String::from_utf8(transport.requests()[0].body.clone().unwrap()).unwrap();
        assert_eq!(
            body,
            r#"{"chat_id":"C1","event":{"type":"rich_message","elements":[]}}"#
        );
    }

    #[tokio::test]
    async fn test_just_browsing() {
        let (transport, engine) = engine();
        let outcome = engine.reply(&postback("just_browsing"), "C2").await.unwrap();

        assert_eq!(outcome, ReplyOutcome::Replied);
        assert_eq!(
            transport.sent_events(),
            vec![("C2".to_string(), text_event(JUST_BROWSING_MESSAGE))]
        );
        assert!(transport.requests_to(Endpoint::TransferChat).is_empty());
    }

    #[tokio::test]
    async fn test_free_text_gets_fallback() {
        let (transport, engine) = engine();
        let event = RichMessageEvent {
            text: "hello?".into(),
            kind: "message".into(),
            postback: None,
        };
        engine.reply(&event, "C3").await.unwrap();

        assert_eq!(
            transport.sent_events(),
            vec![("C3".to_string(), text_event(FALLBACK_MESSAGE))]
        );
        assert_eq!(transport.call_sequence(), vec!["send_event"]);
    }

    #[tokio::test]
    async fn test_transfer_acknowledged_first() {
        let (transport, engine) = engine();
        let outcome = engine
            .reply(&postback("transfer_to_agent"), "C4")
            .await
            .unwrap();

        assert_eq!(outcome, ReplyOutcome::Transferred);
        assert_eq!(transport.call_sequence(), vec!["send_event", "transfer_chat"]);
        assert_eq!(
            transport.sent_events(),
            vec![("C4".to_string(), text_event(TRANSFER_MESSAGE))]
        );
        assert_eq!(
            transport.requests_to(Endpoint::TransferChat)[0].json_body(),
            json!({"id": "C4"})
        );
    }

    #[tokio::test]
    async fn test_transfer_failure_recovered() {
        let (transport, engine) = engine();
        transport.respond(
            "/agent/action/transfer_chat",
            422,
            r#"{"error":{"type":"validation","message":"no agents"}}"#,
        );

        let outcome = engine
            .reply(&postback("transfer_to_agent"), "C5")
            .await
            .unwrap();

        assert_eq!(outcome, ReplyOutcome::TransferFailed);
        assert_eq!(
            transport.call_sequence(),
            vec!["send_event", "transfer_chat", "send_event"]
        );
        assert_eq!(
            transport.sent_events(),
            vec![
                ("C5".to_string(), text_event(TRANSFER_MESSAGE)),
                ("C5".to_string(), text_event(NO_AGENTS_MESSAGE)),
            ]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_transfer_is_not_reported_as_no_agents() {
        let (transport, engine) = engine();
        transport.respond("/agent/action/transfer_chat", 401, "expired");

        let err = engine
            .reply(&postback("transfer_to_agent"), "C8")
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.pending, Some(PendingStep::Transfer));
        assert_eq!(
            transport.sent_events(),
            vec![("C8".to_string(), text_event(TRANSFER_MESSAGE))]
        );
    }

    #[tokio::test]
    async fn test_resume_transfer_skips_acknowledgement() {
        let (transport, engine) = engine();

        let outcome = engine.resume(PendingStep::Transfer, "C9").await.unwrap();

        assert_eq!(outcome, ReplyOutcome::Transferred);
        assert_eq!(transport.call_sequence(), vec!["transfer_chat"]);
    }

    #[tokio::test]
    async fn test_failed_notice_marks_notice_pending() {
        let (transport, engine) = engine();
        transport.respond("/agent/action/transfer_chat", 422, "no agents");
        transport.respond("/agent/action/send_event", 401, "expired");
        transport.respond_once("/agent/action/send_event", 200, "{}");

        let err = engine
            .reply(&postback("transfer_to_agent"), "C10")
            .await
            .unwrap_err();
        assert_eq!(err.pending, Some(PendingStep::NoAgentsNotice));

        transport.respond("/agent/action/send_event", 200, "{}");
        let outcome = engine
            .resume(PendingStep::NoAgentsNotice, "C10")
            .await
            .unwrap();

        assert_eq!(outcome, ReplyOutcome::TransferFailed);
        assert_eq!(
            transport.call_sequence(),
            vec!["send_event", "transfer_chat", "send_event", "send_event"]
        );
        assert_eq!(
            transport.sent_events().last(),
            Some(&("C10".to_string(), text_event(NO_AGENTS_MESSAGE)))
        );
    }

    #[tokio::test]
    async fn test_failed_acknowledgement_skips_transfer() {
        let (transport, engine) = engine();
        transport.respond("/agent/action/send_event", 500, "boom");

        let err = engine
            .reply(&postback("transfer_to_agent"), "C6")
            .await
            .unwrap_err();

        assert_eq!(err.chat_id, "C6");
        assert!(err.pending.is_none());
        assert!(transport.requests_to(Endpoint::TransferChat).is_empty());
    }
}
