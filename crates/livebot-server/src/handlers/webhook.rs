//! Webhook delivery endpoint.

use axum::{body::Bytes, extract::State};
use livebot_engine::RouteOutcome;
use tracing::debug;

use crate::state::AppState;

/// Body answered while the bot is not installed.
pub const NOT_READY_BODY: &str = "integration not ready";

/// POST /reply - Handles one webhook delivery.
///
/// Always answers 200 so the platform does not redeliver.
pub async fn reply(State(state): State<AppState>, body: Bytes) -> &'static str {
    match state.router.handle(&body).await {
        RouteOutcome::NotReady => NOT_READY_BODY,
        outcome => {
            debug!(handled = outcome.is_handled(), ?outcome, "Webhook processed");
            ""
        }
    }
}
