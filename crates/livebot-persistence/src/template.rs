//! Rich-message template loading.

use std::path::Path;

use livebot_models::RichMessageTemplate;
use tracing::info;

use crate::atomic::read_to_string;
use crate::error::{PersistenceError, Result};

/// Loads the rich-message template sent when a chat opens.
///
/// The file is validated as JSON but otherwise kept byte-for-byte.
pub fn load_template(path: &Path) -> Result<RichMessageTemplate> {
    let json = read_to_string(path)?;
    let template =
        RichMessageTemplate::from_json(json.trim()).map_err(|source| PersistenceError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), "Loaded rich message template");
    Ok(template)
}
