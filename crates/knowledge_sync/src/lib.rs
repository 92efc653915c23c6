//! Mirrors project notes into the knowledge directory used for briefings.

pub use daemon::run;
pub use log::{LOG_CAP, LOG_KEEP, SyncEntry, SyncEvent, SyncLog};
pub use syncer::{SyncConfig, Syncer};

mod daemon;
mod log;
mod syncer;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("watcher error: {0}")]
    Watch(#[from] notify::Error),
    #[error("could not encode sync log: {0}")]
    Encode(#[from] serde_json::Error),
}
