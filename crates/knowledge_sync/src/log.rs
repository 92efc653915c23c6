use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::SyncError;

/// Entries kept before the log is trimmed.
pub const LOG_CAP: usize = 1000;
/// Newest entries kept after trimming.
pub const LOG_KEEP: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEvent {
    Created,
    Modified,
    Moved,
    InitialSync,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncEntry {
    pub timestamp: DateTime<Utc>,
    pub event: SyncEvent,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub relative_path: PathBuf,
}

/// Append-only record of copied files, bounded in size.
#[derive(Debug, Default)]
pub struct SyncLog {
    entries: Vec<SyncEntry>,
    dirty: bool,
}

impl SyncLog {
    pub fn push(&mut self, entry: SyncEntry) {
        self.entries.push(entry);
        if self.entries.len() > LOG_CAP {
            let drop = self.entries.len() - LOG_KEEP;
            self.entries.drain(..drop);
        }
        self.dirty = true;
    }

    pub fn entries(&self) -> &[SyncEntry] {
        &self.entries
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the log as pretty JSON and clears the dirty flag.
    pub fn save(&mut self, path: &Path) -> Result<(), SyncError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> SyncEntry {
        SyncEntry {
            timestamp: Utc::now(),
            event: SyncEvent::Modified,
            source: PathBuf::from(format!("/src/{n}.md")),
            destination: PathBuf::from(format!("/dst/{n}.md")),
            relative_path: PathBuf::from(format!("{n}.md")),
        }
    }

    #[test]
    fn trims_to_newest_entries_past_cap() {
        let mut log = SyncLog::default();
        for n in 0..LOG_CAP {
            log.push(entry(n));
        }
        assert_eq!(log.entries().len(), LOG_CAP);

        log.push(entry(LOG_CAP));
        assert_eq!(log.entries().len(), LOG_KEEP);
        assert_eq!(log.entries()[0].relative_path, PathBuf::from("501.md"));
        assert_eq!(
            log.entries()[LOG_KEEP - 1].relative_path,
            PathBuf::from("1000.md")
        );
    }

    #[test]
    fn save_writes_json_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/sync_log.json");

        let mut log = SyncLog::default();
        assert!(!log.is_dirty());
        log.push(entry(1));
        assert!(log.is_dirty());

        log.save(&path).unwrap();
        assert!(!log.is_dirty());

        let saved: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved[0]["event"], "modified");
        assert_eq!(saved[0]["relative_path"], "1.md");
    }
}
