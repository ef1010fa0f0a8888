//! Swappable database snapshots
//!
//! The database is never mutated in place. A rebuild produces a new
//! [`GameDatabase`] which replaces the previous snapshot in one step; readers
//! that already hold an `Arc` keep using the snapshot they took.
//!
//! ```text
//! gamedata.json ──► GameDatabase::load ──► DatabaseStore::replace ──► subscribers
//!        ▲                                                    │
//!        └────────── reload task (mtime poll) ◄───────────────┘
//! ```

use super::database::GameDatabase;
use super::error::GameDataError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct DatabaseStore {
    tx: Arc<watch::Sender<Arc<GameDatabase>>>,
}

impl DatabaseStore {
    pub fn new(database: GameDatabase) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(database));
        Self { tx: Arc::new(tx) }
    }

    pub fn empty() -> Self {
        Self::new(GameDatabase::empty())
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<GameDatabase> {
        self.tx.borrow().clone()
    }

    /// Publishes a new snapshot and returns the one it replaced
    pub fn replace(&self, database: GameDatabase) -> Arc<GameDatabase> {
        let previous = self.tx.send_replace(Arc::new(database));
        debug!(
            "Replaced database snapshot built at {}",
            previous.built_at().format("%H:%M:%S")
        );
        previous
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<GameDatabase>> {
        self.tx.subscribe()
    }

    /// Loads `path` and swaps it in. On failure the current snapshot stays.
    pub async fn rebuild_from(&self, path: &Path) -> Result<Arc<GameDatabase>, GameDataError> {
        let database = GameDatabase::load(path).await?;
        info!(
            "Rebuilt game database from {} ({} entries)",
            path.display(),
            database.len()
        );
        self.replace(database);
        Ok(self.snapshot())
    }

    /// Polls the modification time of `path` and rebuilds whenever it changes
    ///
    /// The task ends when `token` is cancelled.
    pub fn spawn_reload_task(
        &self,
        path: PathBuf,
        interval: Duration,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        let store = self.clone();
        info!(
            "Starting gamedata reload task for {} every {:?}",
            path.display(),
            interval
        );

        tokio::spawn(async move {
            let mut last_seen = modified_time(&path).await;
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("Gamedata reload task cancelled");
                        break;
                    }
                    _ = ticker.tick() => {}
                }

                store.reload_if_changed(&path, &mut last_seen).await;
            }
        })
    }

    /// Rebuilds when the mtime of `path` differs from `last_seen`
    ///
    /// `last_seen` advances even when the rebuild fails, so a broken revision
    /// is reported once rather than on every poll. Returns whether a rebuild
    /// was attempted.
    pub async fn reload_if_changed(
        &self,
        path: &Path,
        last_seen: &mut Option<SystemTime>,
    ) -> bool {
        let current = modified_time(path).await;
        if current.is_none() || current == *last_seen {
            return false;
        }
        *last_seen = current;

        if let Err(e) = self.rebuild_from(path).await {
            error!("Failed to reload gamedata, keeping previous snapshot: {}", e);
        }
        true
    }
}

async fn modified_time(path: &Path) -> Option<SystemTime> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.modified().ok(),
        Err(e) => {
            warn!("Unable to stat {}: {}", path.display(), e);
            None
        }
    }
}
