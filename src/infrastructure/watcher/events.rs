//! Raw filesystem event translation (spec §4.7): wraps a `notify`
//! recommended watcher, debounces bursts per path, and resolves
//! delete+create pairs with matching `content_hash` into `Moved` events
//! within the configured move window.

use super::debounce::Debouncer;
use crate::domain::error::{Error, Result};
use crate::domain::types::{FileEvent, FileEventKind, RepositoryId};
use dashmap::DashMap;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel as std_channel;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Tuning for one watcher instance, mirroring the spec §6 configuration keys.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub debounce: Duration,
    pub move_window: Duration,
    pub poll_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(crate::domain::constants::DEFAULT_DEBOUNCE_MS),
            move_window: Duration::from_millis(crate::domain::constants::DEFAULT_DEBOUNCE_MS * 4),
            poll_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawKind {
    Created,
    Modified,
}

/// Watches one repository root and emits debounced, move-resolved
/// `FileEvent`s. Kept alive for as long as the watch should run; dropping it
/// stops the underlying `notify` watcher and, once the bridge thread notices
/// the channel is gone, the resolver task.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Start watching `root` and return the event receiver.
    pub fn start(
        root: PathBuf,
        repository_id: RepositoryId,
        config: WatcherConfig,
    ) -> Result<(Self, mpsc::Receiver<FileEvent>)> {
        let (raw_tx, raw_rx) = std_channel();
        let mut watcher = notify::recommended_watcher(raw_tx)
            .map_err(|e| Error::storage(format!("failed to start file watcher: {e}")))?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| Error::storage(format!("failed to watch {}: {e}", root.display())))?;

        let (bridge_tx, bridge_rx) = tokio::sync::mpsc::channel(1024);
        std::thread::spawn(move || run_raw_pump(raw_rx, bridge_tx));

        let (tx, rx) = mpsc::channel(1024);
        tokio::spawn(run_resolver(root, repository_id, config, bridge_rx, tx));

        Ok((Self { _watcher: watcher }, rx))
    }
}

/// Forwards `notify`'s synchronous callback channel onto an async one, since
/// the resolver task needs to `select!` against it alongside its own timers.
fn run_raw_pump(raw_rx: std::sync::mpsc::Receiver<notify::Result<Event>>, bridge_tx: tokio::sync::mpsc::Sender<Event>) {
    for event in raw_rx {
        match event {
            Ok(event) => {
                if bridge_tx.blocking_send(event).is_err() {
                    break;
                }
            }
            Err(err) => warn!(error = %err, "file watcher error"),
        }
    }
}

async fn run_resolver(
    root: PathBuf,
    repository_id: RepositoryId,
    config: WatcherConfig,
    mut raw_rx: tokio::sync::mpsc::Receiver<Event>,
    tx: mpsc::Sender<FileEvent>,
) {
    let debouncer: Debouncer<RawKind> = Debouncer::new(config.debounce);
    let known_hashes: DashMap<String, String> = DashMap::new();
    let pending_delete: DashMap<String, (String, Instant)> = DashMap::new();
    let mut ticker = tokio::time::interval(config.poll_interval);

    loop {
        tokio::select! {
            maybe_event = raw_rx.recv() => {
                let Some(event) = maybe_event else { break };
                handle_raw_event(&root, event, &debouncer, &known_hashes, &pending_delete, &tx, repository_id).await;
            }
            _ = ticker.tick() => {
                flush_ready(&debouncer, &pending_delete, &tx, repository_id, config.move_window).await;
                sweep_expired_deletes(&pending_delete, &tx, repository_id, config.move_window).await;
            }
        }
        if tx.is_closed() {
            break;
        }
    }
}

async fn handle_raw_event(
    root: &Path,
    event: Event,
    debouncer: &Debouncer<RawKind>,
    known_hashes: &DashMap<String, String>,
    pending_delete: &DashMap<String, (String, Instant)>,
    tx: &mpsc::Sender<FileEvent>,
    repository_id: RepositoryId,
) {
    for path in event.paths {
        if path.is_dir() {
            continue;
        }
        let Some(relative_path) = relativize(root, &path) else { continue };
        match event.kind {
            EventKind::Create(_) => {
                let Some(hash) = hash_file(&path).await else { continue };
                if let Some((_, (old_path, _))) = pending_delete.remove(&hash) {
                    debouncer.cancel(&old_path);
                    known_hashes.insert(relative_path.clone(), hash);
                    let _ = tx
                        .send(FileEvent {
                            repository_id,
                            relative_path,
                            kind: FileEventKind::Moved {
                                old_relative_path: old_path,
                            },
                        })
                        .await;
                } else {
                    known_hashes.insert(relative_path.clone(), hash);
                    debouncer.touch(&relative_path, RawKind::Created);
                }
            }
            EventKind::Modify(_) => {
                let Some(hash) = hash_file(&path).await else { continue };
                known_hashes.insert(relative_path.clone(), hash);
                debouncer.touch(&relative_path, RawKind::Modified);
            }
            EventKind::Remove(_) => {
                debouncer.cancel(&relative_path);
                if let Some((_, hash)) = known_hashes.remove(&relative_path) {
                    pending_delete.insert(hash, (relative_path, Instant::now()));
                } else {
                    // Never observed (hashed) before deletion; nothing to
                    // match a future create against, so emit directly.
                    let _ = tx
                        .send(FileEvent {
                            repository_id,
                            relative_path,
                            kind: FileEventKind::Deleted,
                        })
                        .await;
                }
            }
            _ => {}
        }
    }
}

async fn flush_ready(
    debouncer: &Debouncer<RawKind>,
    _pending_delete: &DashMap<String, (String, Instant)>,
    tx: &mpsc::Sender<FileEvent>,
    repository_id: RepositoryId,
    _move_window: Duration,
) {
    for (relative_path, kind) in debouncer.drain_ready_keyed() {
        let kind = match kind {
            RawKind::Created => FileEventKind::Created,
            RawKind::Modified => FileEventKind::Modified,
        };
        let _ = tx
            .send(FileEvent {
                repository_id,
                relative_path,
                kind,
            })
            .await;
    }
}

async fn sweep_expired_deletes(
    pending_delete: &DashMap<String, (String, Instant)>,
    tx: &mpsc::Sender<FileEvent>,
    repository_id: RepositoryId,
    move_window: Duration,
) {
    let expired: Vec<(String, String)> = pending_delete
        .iter()
        .filter(|entry| entry.value().1.elapsed() >= move_window)
        .map(|entry| (entry.key().clone(), entry.value().0.clone()))
        .collect();
    for (hash, old_path) in expired {
        pending_delete.remove(&hash);
        debug!(path = %old_path, "move window expired, treating as delete");
        let _ = tx
            .send(FileEvent {
                repository_id,
                relative_path: old_path,
                kind: FileEventKind::Deleted,
            })
            .await;
    }
}

fn relativize(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(|p| p.to_string_lossy().replace('\\', "/"))
}

async fn hash_file(path: &Path) -> Option<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path).ok()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Some(hasher.finalize().iter().map(|b| format!("{b:02x}")).collect())
    })
    .await
    .ok()
    .flatten()
}
