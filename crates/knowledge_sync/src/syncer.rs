use std::path::{Path, PathBuf};

use chrono::Utc;
use notify::{
    Event, EventKind,
    event::{ModifyKind, RenameMode},
};
use serde::Deserialize;

use crate::{SyncError, SyncEntry, SyncEvent, SyncLog};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub enabled: bool,
    /// Tree being watched.
    pub source_dir: PathBuf,
    /// Where copies land, mirroring the source layout.
    pub mirror_dir: PathBuf,
    pub extensions: Vec<String>,
    /// Directory names skipped anywhere in a path.
    pub excluded_dirs: Vec<String>,
    pub save_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source_dir: PathBuf::from("."),
            mirror_dir: PathBuf::from("knowledge/lif3"),
            extensions: ["md", "txt", "json"].map(String::from).to_vec(),
            excluded_dirs: ["node_modules", ".git", "dist", "logs", "storage"]
                .map(String::from)
                .to_vec(),
            save_interval_secs: 5,
        }
    }
}

impl SyncConfig {
    pub fn log_path(&self) -> PathBuf {
        self.mirror_dir.join("sync_log.json")
    }
}

/// Copies matching files from the source tree into the mirror and records
/// every copy.
#[derive(Debug)]
pub struct Syncer {
    config: SyncConfig,
    /// Absolute forms of the configured roots, compared against event paths.
    source_root: PathBuf,
    mirror_root: PathBuf,
    log: SyncLog,
}

impl Syncer {
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        std::fs::create_dir_all(&config.mirror_dir)?;
        Ok(Self {
            source_root: std::path::absolute(&config.source_dir)?,
            mirror_root: std::path::absolute(&config.mirror_dir)?,
            config,
            log: SyncLog::default(),
        })
    }

    /// Whether `path` lies inside the mirror, however it is spelled.
    fn in_mirror(&self, path: &Path) -> bool {
        std::path::absolute(path).is_ok_and(|path| path.starts_with(&self.mirror_root))
    }

    pub fn log(&self) -> &SyncLog {
        &self.log
    }

    pub fn save_log(&mut self) -> Result<(), SyncError> {
        let path = self.config.log_path();
        self.log.save(&path)
    }

    pub fn save_log_if_dirty(&mut self) -> Result<(), SyncError> {
        if self.log.is_dirty() {
            self.save_log()?;
        }
        Ok(())
    }

    fn relative(&self, path: &Path) -> Option<PathBuf> {
        let absolute = std::path::absolute(path).ok()?;
        if absolute.starts_with(&self.mirror_root) {
            return None;
        }
        let rel = absolute.strip_prefix(&self.source_root).ok()?;

        let extension_ok = rel
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.config.extensions.iter().any(|x| x == ext));
        let excluded = rel.components().any(|c| {
            c.as_os_str()
                .to_str()
                .is_some_and(|name| self.config.excluded_dirs.iter().any(|x| x == name))
        });

        (extension_ok && !excluded).then(|| rel.to_path_buf())
    }

    /// Copies one file. Returns `None` when the path is filtered out.
    pub fn sync_file(&mut self, path: &Path, event: SyncEvent) -> Result<Option<PathBuf>, SyncError> {
        let Some(relative_path) = self.relative(path) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }

        let destination = self.config.mirror_dir.join(&relative_path);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(path, &destination)?;

        tracing::debug!(?event, path = %relative_path.display(), "synced");
        self.log.push(SyncEntry {
            timestamp: Utc::now(),
            event,
            source: path.to_path_buf(),
            destination: destination.clone(),
            relative_path,
        });
        Ok(Some(destination))
    }

    /// Applies one watcher event. Copy failures are logged, not returned, so
    /// one unreadable file never stops the daemon.
    pub fn handle(&mut self, event: &Event) -> usize {
        let (kind, paths): (SyncEvent, &[PathBuf]) = match event.kind {
            EventKind::Create(_) => (SyncEvent::Created, event.paths.as_slice()),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                (SyncEvent::Moved, event.paths.get(1..).unwrap_or_default())
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => (SyncEvent::Moved, event.paths.as_slice()),
            EventKind::Modify(ModifyKind::Name(_)) => return 0,
            EventKind::Modify(_) => (SyncEvent::Modified, event.paths.as_slice()),
            _ => return 0,
        };

        let mut synced = 0;
        for path in paths {
            match self.sync_file(path, kind) {
                Ok(Some(_)) => synced += 1,
                Ok(None) => {}
                Err(err) => tracing::warn!(path = %path.display(), "sync failed: {err}"),
            }
        }
        synced
    }

    /// Copies every matching file under the source directory.
    pub fn initial_sync(&mut self) -> Result<usize, SyncError> {
        let mut pending = vec![self.config.source_dir.clone()];
        let mut synced = 0;

        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    let skip = self.in_mirror(&path)
                        || path
                            .file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| self.config.excluded_dirs.iter().any(|x| x == n));
                    if !skip {
                        pending.push(path);
                    }
                } else if self.sync_file(&path, SyncEvent::InitialSync)?.is_some() {
                    synced += 1;
                }
            }
        }

        tracing::info!(files = synced, "initial knowledge sync complete");
        Ok(synced)
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{CreateKind, DataChange};

    use super::*;

    struct Fixture {
        _dir: tempfile::TempDir,
        source: PathBuf,
        mirror: PathBuf,
    }

    fn fixture() -> (Fixture, Syncer) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("project");
        let mirror = dir.path().join("knowledge/lif3");
        std::fs::create_dir_all(source.join("docs")).unwrap();
        std::fs::create_dir_all(source.join("node_modules/pkg")).unwrap();

        let syncer = Syncer::new(SyncConfig {
            enabled: true,
            source_dir: source.clone(),
            mirror_dir: mirror.clone(),
            ..SyncConfig::default()
        })
        .unwrap();
        (
            Fixture {
                _dir: dir,
                source,
                mirror,
            },
            syncer,
        )
    }

    #[test]
    fn initial_sync_copies_matching_files_only() {
        let (fx, mut syncer) = fixture();
        std::fs::write(fx.source.join("README.md"), "# LIF3").unwrap();
        std::fs::write(fx.source.join("docs/goals.txt"), "R1.8M").unwrap();
        std::fs::write(fx.source.join("docs/data.json"), "{}").unwrap();
        std::fs::write(fx.source.join("main.rs"), "fn main() {}").unwrap();
        std::fs::write(fx.source.join("node_modules/pkg/readme.md"), "skip").unwrap();

        assert_eq!(syncer.initial_sync().unwrap(), 3);
        assert_eq!(
            std::fs::read_to_string(fx.mirror.join("docs/goals.txt")).unwrap(),
            "R1.8M"
        );
        assert!(!fx.mirror.join("main.rs").exists());
        assert!(!fx.mirror.join("node_modules").exists());
        assert!(
            syncer
                .log()
                .entries()
                .iter()
                .all(|e| e.event == SyncEvent::InitialSync)
        );
    }

    #[test]
    fn modify_event_recopies_file() {
        let (fx, mut syncer) = fixture();
        let file = fx.source.join("docs/plan.md");
        std::fs::write(&file, "v1").unwrap();
        syncer.initial_sync().unwrap();

        std::fs::write(&file, "v2").unwrap();
        let event = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(file.clone());
        assert_eq!(syncer.handle(&event), 1);

        assert_eq!(std::fs::read_to_string(fx.mirror.join("docs/plan.md")).unwrap(), "v2");
        assert_eq!(syncer.log().entries().last().unwrap().event, SyncEvent::Modified);
    }

    #[test]
    fn rename_syncs_destination_path() {
        let (fx, mut syncer) = fixture();
        let from = fx.source.join("old.md");
        let to = fx.source.join("new.md");
        std::fs::write(&to, "moved").unwrap();

        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(from)
            .add_path(to);
        assert_eq!(syncer.handle(&event), 1);
        assert!(fx.mirror.join("new.md").exists());
        assert!(!fx.mirror.join("old.md").exists());
    }

    #[test]
    fn ignores_outside_and_excluded_paths() {
        let (fx, mut syncer) = fixture();
        let outside = tempfile::NamedTempFile::new().unwrap();
        let excluded = fx.source.join("node_modules/pkg/index.md");
        std::fs::write(&excluded, "x").unwrap();

        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(outside.path().to_path_buf())
            .add_path(excluded);
        assert_eq!(syncer.handle(&event), 0);
        assert!(syncer.log().entries().is_empty());
    }

    #[test]
    fn nested_mirror_is_never_synced_back() {
        let dir = tempfile::tempdir().unwrap();
        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let mut syncer = Syncer::new(SyncConfig {
            enabled: true,
            source_dir: PathBuf::from("."),
            mirror_dir: PathBuf::from("knowledge/lif3"),
            ..SyncConfig::default()
        })
        .unwrap();
        std::fs::write("notes.md", "source").unwrap();
        std::fs::write("knowledge/lif3/copied.md", "mirror").unwrap();

        let from_mirror = syncer
            .sync_file(Path::new("./knowledge/lif3/copied.md"), SyncEvent::Created)
            .unwrap();
        let plain = syncer
            .sync_file(Path::new("knowledge/lif3/copied.md"), SyncEvent::Modified)
            .unwrap();
        syncer.save_log().unwrap();
        let log = syncer
            .sync_file(Path::new("./knowledge/lif3/sync_log.json"), SyncEvent::Modified)
            .unwrap();
        let synced = syncer.initial_sync().unwrap();
        let nested = Path::new("knowledge/lif3/knowledge").exists();
        let copied = std::fs::read_to_string("knowledge/lif3/notes.md");

        std::env::set_current_dir(previous).unwrap();
        assert_eq!(from_mirror, None);
        assert_eq!(plain, None);
        assert_eq!(log, None);
        assert_eq!(synced, 1);
        assert!(!nested);
        assert_eq!(copied.unwrap(), "source");
    }

    #[test]
    fn save_log_writes_into_mirror() {
        let (fx, mut syncer) = fixture();
        std::fs::write(fx.source.join("a.md"), "a").unwrap();
        syncer.initial_sync().unwrap();
        syncer.save_log_if_dirty().unwrap();

        let saved: Vec<serde_json::Value> =
            serde_json::from_slice(&std::fs::read(fx.mirror.join("sync_log.json")).unwrap())
                .unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0]["event"], "initial_sync");
        assert!(!syncer.log().is_dirty());
    }
}
