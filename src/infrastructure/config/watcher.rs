//! Hot-reloads the configuration file, independent of the File Watcher
//! that watches *source* files (spec §9 ambient layer split).

use super::loader::ConfigLoader;
use super::types::Config;
use arc_swap::ArcSwap;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::channel;
use tracing::{error, info, warn};

/// Holds the current `Config` behind an `ArcSwap`, refreshed whenever the
/// backing file changes on disk.
pub struct ConfigWatcher {
    current: Arc<ArcSwap<Config>>,
    _watcher: Option<RecommendedWatcher>,
}

impl ConfigWatcher {
    /// Load `path` (if given) and start watching it for changes. If `path`
    /// is `None`, only embedded defaults and environment overrides apply
    /// and no filesystem watch is started.
    pub fn start(path: Option<PathBuf>) -> crate::domain::error::Result<Self> {
        let loader = ConfigLoader::new();
        let initial = match &path {
            Some(p) => loader.load_with_file(p)?,
            None => loader.load()?,
        };
        let current = Arc::new(ArcSwap::from_pointee(initial));

        let watcher = match &path {
            Some(p) => Some(Self::spawn_watch(p.clone(), current.clone())?),
            None => None,
        };

        Ok(Self {
            current,
            _watcher: watcher,
        })
    }

    /// Current configuration snapshot.
    pub fn current(&self) -> Arc<Config> {
        self.current.load_full()
    }

    fn spawn_watch(path: PathBuf, current: Arc<ArcSwap<Config>>) -> crate::domain::error::Result<RecommendedWatcher> {
        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(tx)
            .map_err(|e| crate::domain::error::Error::storage(format!("failed to start config watcher: {e}")))?;
        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|e| crate::domain::error::Error::storage(format!("failed to watch config file: {e}")))?;

        let reload_path = path.clone();
        std::thread::spawn(move || {
            for event in rx {
                let Ok(event) = event else { continue };
                if !matches!(event.kind, notify::EventKind::Modify(_)) {
                    continue;
                }
                match Self::reload(&reload_path) {
                    Ok(new_config) => {
                        current.store(Arc::new(new_config));
                        info!(path = %reload_path.display(), "configuration reloaded");
                    }
                    Err(err) => {
                        warn!(path = %reload_path.display(), error = %err, "configuration reload failed, keeping previous");
                    }
                }
            }
            error!("configuration watcher channel closed");
        });

        Ok(watcher)
    }

    fn reload(path: &Path) -> crate::domain::error::Result<Config> {
        ConfigLoader::new().load_with_file(path)
    }
}
