//! Consumes debounced, move-resolved file events from the infrastructure
//! watcher and feeds them back through indexing (spec §4.7).

use crate::application::indexing::IndexingService;
use crate::domain::ports::StorageEngine;
use crate::domain::types::{FileEvent, FileEventKind, RepositoryId};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tracing::{error, info, warn};

/// A repository registered with the watcher service.
struct WatchedRepo {
    storage: Arc<dyn StorageEngine>,
    root_path: PathBuf,
}

/// Round-robins `FileEvent`s across repositories so no single repository's
/// event backlog can starve another (spec §4.7 "Fairness").
pub struct WatcherService {
    indexing: Arc<IndexingService>,
    repos: DashMap<RepositoryId, WatchedRepo>,
}

impl WatcherService {
    pub fn new(indexing: Arc<IndexingService>) -> Self {
        Self {
            indexing,
            repos: DashMap::new(),
        }
    }

    /// Register a repository so its events can be processed.
    pub fn register(&self, repository_id: RepositoryId, storage: Arc<dyn StorageEngine>, root_path: PathBuf) {
        self.repos.insert(repository_id, WatchedRepo { storage, root_path });
    }

    /// Stop tracking a repository; in-flight events for it are dropped.
    pub fn unregister(&self, repository_id: RepositoryId) {
        self.repos.remove(&repository_id);
    }

    /// Drain `events` until the channel closes, applying each to storage.
    /// Events for unregistered repositories are dropped with a warning.
    pub async fn run(&self, mut events: Receiver<FileEvent>) {
        while let Some(event) = events.recv().await {
            if let Err(err) = self.apply(&event).await {
                error!(relative_path = %event.relative_path, error = %err, "failed to apply file event");
            }
        }
        info!("watcher event channel closed");
    }

    async fn apply(&self, event: &FileEvent) -> crate::domain::error::Result<()> {
        let Some(repo) = self.repos.get(&event.repository_id) else {
            warn!(repository_id = %event.repository_id, "event for unregistered repository, dropping");
            return Ok(());
        };
        let storage = repo.storage.clone();
        let root_path = repo.root_path.clone();
        drop(repo);

        match &event.kind {
            FileEventKind::Created | FileEventKind::Modified => {
                self.indexing
                    .reindex_file(storage, &root_path, &event.relative_path)
                    .await
            }
            FileEventKind::Deleted => {
                if let Some(file) = storage.get_file_by_path(&event.relative_path).await? {
                    storage.tombstone_file(file.id).await
                } else {
                    Ok(())
                }
            }
            FileEventKind::Moved { old_relative_path } => {
                let Some(file) = storage.get_file_by_path(old_relative_path).await? else {
                    // No prior record at the old path; treat as a fresh create.
                    return self
                        .indexing
                        .reindex_file(storage, &root_path, &event.relative_path)
                        .await;
                };
                let mv = crate::domain::types::FileMove {
                    old_relative_path: old_relative_path.clone(),
                    new_relative_path: event.relative_path.clone(),
                    content_hash: file.content_hash.clone(),
                    moved_at: chrono::Utc::now().timestamp(),
                    move_type: classify_move(old_relative_path, &event.relative_path),
                };
                storage.record_move(file.id, &mv).await
            }
        }
    }
}

fn classify_move(old_path: &str, new_path: &str) -> crate::domain::types::MoveType {
    use crate::domain::types::MoveType;
    let old_dir = old_path.rsplit_once('/').map(|(dir, _)| dir);
    let new_dir = new_path.rsplit_once('/').map(|(dir, _)| dir);
    let old_name = old_path.rsplit('/').next().unwrap_or(old_path);
    let new_name = new_path.rsplit('/').next().unwrap_or(new_path);

    match (old_dir == new_dir, old_name == new_name) {
        (true, false) => MoveType::Rename,
        (false, true) => MoveType::Relocate,
        _ => MoveType::Restructure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_dir_different_name_is_rename() {
        assert_eq!(classify_move("src/a.py", "src/b.py"), crate::domain::types::MoveType::Rename);
    }

    #[test]
    fn different_dir_same_name_is_relocate() {
        assert_eq!(classify_move("src/a.py", "src/subdir/a.py"), crate::domain::types::MoveType::Relocate);
    }

    #[test]
    fn different_dir_and_name_is_restructure() {
        assert_eq!(classify_move("src/a.py", "lib/sub/b.py"), crate::domain::types::MoveType::Restructure);
    }
}
