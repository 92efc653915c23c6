use std::{future::Future, time::Duration};

use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::{SyncConfig, SyncError, Syncer};

/// Runs the sync daemon until `shutdown` resolves.
///
/// Performs a full sync first, then mirrors watcher events as they arrive.
/// The log is flushed every `save_interval_secs` when it changed, and once
/// more on shutdown.
pub async fn run<F>(config: SyncConfig, shutdown: F) -> Result<(), SyncError>
where
    F: Future<Output = ()>,
{
    let source = config.source_dir.clone();
    let interval = Duration::from_secs(config.save_interval_secs.max(1));
    let mut syncer = Syncer::new(config)?;
    syncer.initial_sync()?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        // The receiver is gone only during shutdown.
        let _ = tx.send(res);
    })?;
    watcher.watch(&source, RecursiveMode::Recursive)?;
    tracing::info!(source = %source.display(), "watching knowledge sources");

    let mut ticker = tokio::time::interval(interval);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(res) = rx.recv() => match res {
                Ok(event) => {
                    syncer.handle(&event);
                }
                Err(err) => tracing::warn!("watch error: {err}"),
            },
            _ = ticker.tick() => {
                if let Err(err) = syncer.save_log_if_dirty() {
                    tracing::warn!("could not save sync log: {err}");
                }
            }
        }
    }

    drop(watcher);
    syncer.save_log_if_dirty()?;
    tracing::info!("knowledge sync stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn syncs_and_saves_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        let mirror = dir.path().join("mirror");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("notes.md"), "hello").unwrap();

        let config = SyncConfig {
            enabled: true,
            source_dir: source,
            mirror_dir: mirror.clone(),
            ..SyncConfig::default()
        };
        run(config, async {}).await.unwrap();

        assert_eq!(std::fs::read_to_string(mirror.join("notes.md")).unwrap(), "hello");
        assert!(mirror.join("sync_log.json").exists());
    }

    #[tokio::test]
    async fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = SyncConfig {
            enabled: true,
            source_dir: dir.path().join("absent"),
            mirror_dir: dir.path().join("mirror"),
            ..SyncConfig::default()
        };
        assert!(run(config, async {}).await.is_err());
    }
}
