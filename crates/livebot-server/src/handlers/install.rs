//! OAuth install callback.

use axum::extract::{Query, State};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::InstallQuery;

/// GET|POST /install?code=... - Completes the install with an authorization code.
pub async fn install(
    State(state): State<AppState>,
    Query(query): Query<InstallQuery>,
) -> Result<String> {
    let code = query
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing authorization code".to_string()))?;

    let record = state.installation.install(&code).await?;
    info!(bot_id = %record.bot_id, "Install callback completed");
    Ok(format!("Thanks for installing! Bot {} is now accepting chats.", record.bot_id))
}
