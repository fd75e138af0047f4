//! Persistence layer for livebot.
//!
//! Everything livebot keeps on disk is JSON: the installation record written
//! after a successful install, and the rich-message template shipped with
//! the deployment. Writes go through a temp file followed by a rename, so a
//! crash never leaves a half-written installation record behind.
//!
//! # Example
//!
//! ```no_run
//! use livebot_models::InstallationRecord;
//! use livebot_persistence::InstallationStore;
//!
//! let store = InstallationStore::new("/var/lib/livebot");
//!
//! store.save(&InstallationRecord::new("refresh-token", "bot-id")).unwrap();
//! let loaded = store.load().unwrap();
//! assert!(loaded.is_some());
//! ```

pub mod atomic;
pub mod error;
pub mod installation_store;
pub mod template;

pub use error::{PersistenceError, Result};
pub use installation_store::InstallationStore;
pub use template::load_template;
