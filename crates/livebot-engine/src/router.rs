//! Webhook dispatch.
//!
//! Every delivery ends in a [`RouteOutcome`]; nothing here fails the request.
//! The platform only needs an acknowledgement, and retrying a delivery whose
//! body we could not decode would not help.

use std::sync::Arc;

use livebot_models::{IncomingChatEvent, IncomingChatOpened, WebhookAction, WebhookEnvelope};
use tracing::{debug, error, info, warn};

use crate::error::{DecodeError, ReplyError};
use crate::installation::InstallationManager;
use crate::reply::{ReplyEngine, ReplyOutcome};

/// How a webhook delivery was handled.
#[derive(Debug)]
pub enum RouteOutcome {
    /// Rich-message template sent to a new chat.
    TemplateSent {
        chat_id: String,
    },
    /// Visitor event answered.
    Replied {
        chat_id: String,
        outcome: ReplyOutcome,
    },
    /// Action this bot does not handle.
    Ignored {
        action: WebhookAction,
    },
    /// Bot is not installed yet.
    NotReady,
    /// Body could not be decoded.
    Rejected(DecodeError),
    /// Reply could not be delivered.
    Failed(ReplyError),
}

impl RouteOutcome {
    /// Whether the delivery was processed without error.
    pub fn is_handled(&self) -> bool {
        matches!(
            self,
            RouteOutcome::TemplateSent { .. }
                | RouteOutcome::Replied { .. }
                | RouteOutcome::Ignored { .. }
        )
    }
}

/// Decodes webhook deliveries and hands them to the [`ReplyEngine`].
#[derive(Debug, Clone)]
pub struct WebhookRouter {
    installation: Arc<InstallationManager>,
    replies: ReplyEngine,
}

impl WebhookRouter {
    pub fn new(installation: Arc<InstallationManager>, replies: ReplyEngine) -> Self {
        Self {
            installation,
            replies,
        }
    }

    /// Handles one raw webhook body.
    ///
    /// A delivery rejected with 401 triggers one token refresh and one retry,
    /// resuming at the step that failed.
    pub async fn handle(&self, body: &[u8]) -> RouteOutcome {
        if !self.installation.is_installed().await {
            warn!("Webhook received before installation");
            return RouteOutcome::NotReady;
        }

        let envelope: WebhookEnvelope = match serde_json::from_slice(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Malformed webhook envelope");
                return RouteOutcome::Rejected(DecodeError::new("webhook envelope", e));
            }
        };
        debug!(action = %envelope.action, "Webhook received");

        let seen = self.installation.auth_snapshot();
        let outcome = self.dispatch(&envelope).await;

        let outcome = match outcome {
            RouteOutcome::Failed(e) if e.is_unauthorized() => {
                info!(chat_id = %e.chat_id, "Access token rejected, refreshing");
                match self.installation.refresh_after_rejection(seen).await {
                    Ok(()) => self.retry(&envelope, e).await,
                    Err(refresh_err) => {
                        error!(error = %refresh_err, "Token refresh failed, reinstall required");
                        RouteOutcome::Failed(e)
                    }
                }
            }
            other => other,
        };

        if let RouteOutcome::Failed(e) = &outcome {
            error!(chat_id = %e.chat_id, error = %e, "Reply delivery failed");
        }
        outcome
    }

    // Parts of the reply the visitor already got are not sent again.
    async fn retry(&self, envelope: &WebhookEnvelope, failed: ReplyError) -> RouteOutcome {
        match failed.pending {
            Some(step) => match self.replies.resume(step, &failed.chat_id).await {
                Ok(outcome) => RouteOutcome::Replied {
                    chat_id: failed.chat_id,
                    outcome,
                },
                Err(e) => RouteOutcome::Failed(e),
            },
            None => self.dispatch(envelope).await,
        }
    }

    async fn dispatch(&self, envelope: &WebhookEnvelope) -> RouteOutcome {
        match &envelope.action {
            WebhookAction::IncomingChat => {
                let opened: IncomingChatOpened = match envelope.decode_payload() {
                    Ok(opened) => opened,
                    Err(e) => return rejected("incoming_chat payload", e),
                };
                let chat_id = opened.chat.id;
                match self.replies.send_template(&chat_id).await {
                    Ok(()) => RouteOutcome::TemplateSent { chat_id },
                    Err(e) => RouteOutcome::Failed(e),
                }
            }
            WebhookAction::IncomingEvent => {
                let incoming: IncomingChatEvent = match envelope.decode_payload() {
                    Ok(incoming) => incoming,
                    Err(e) => return rejected("incoming_event payload", e),
                };
                match self.replies.reply(&incoming.event, &incoming.chat_id).await {
                    Ok(outcome) => RouteOutcome::Replied {
                        chat_id: incoming.chat_id,
                        outcome,
                    },
                    Err(e) => RouteOutcome::Failed(e),
                }
            }
            other => {
                debug!(action = %other, "Ignoring webhook action");
                RouteOutcome::Ignored {
                    action: other.clone(),
                }
            }
        }
    }
}

fn rejected(what: &'static str, e: serde_json::Error) -> RouteOutcome {
    warn!(error = %e, "Malformed {}", what);
    RouteOutcome::Rejected(DecodeError::new(what, e))
}
