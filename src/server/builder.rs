//! Fluent builder assembling the dependency graph for one repository:
//! config, storage, plugin registry, dispatcher, indexing/query engines,
//! watcher service, and the `Handler` that sits in front of them all.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapters::plugins::StaticPluginRegistry;
use crate::application::dispatcher::Dispatcher;
use crate::application::indexing::{repository_id_for, IndexingService};
use crate::application::query::QueryEngine;
use crate::application::watcher_service::WatcherService;
use crate::domain::error::Result;
use crate::domain::ports::{EmbeddingProvider, Handler, PluginRegistry, RateLimiterBackend, StorageEngine, StorageFactory};
use crate::infrastructure::config::types::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::di::DiContainer;
use crate::infrastructure::resilience::InMemoryRateLimiter;
use crate::infrastructure::storage::SqliteStorageFactory;
use crate::infrastructure::watcher::{FileWatcher, WatcherConfig};
use crate::infrastructure::workers::WorkerPool;

use super::handler::McpHandler;

/// Everything needed to start serving one repository.
pub struct ServerComponents {
    pub handler: Arc<dyn Handler>,
    pub watcher_service: Arc<WatcherService>,
    pub storage: Arc<dyn StorageEngine>,
    pub root_path: PathBuf,
}

/// Builds `ServerComponents`, falling back to config defaults and the
/// DI-resolved null adapters when the caller doesn't override them.
#[derive(Default)]
pub struct McpServerBuilder {
    config: Option<Config>,
    root_path: Option<PathBuf>,
    registry: Option<Arc<dyn PluginRegistry>>,
    storage_factory: Option<Arc<dyn StorageFactory>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl McpServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_root_path(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn PluginRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_storage_factory(mut self, factory: Arc<dyn StorageFactory>) -> Self {
        self.storage_factory = Some(factory);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub async fn build(self) -> Result<ServerComponents> {
        let config = match self.config {
            Some(config) => config,
            None => ConfigLoader::new().load()?,
        };

        let root_path = self
            .root_path
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let registry = self.registry.unwrap_or_else(|| StaticPluginRegistry::with_defaults() as Arc<dyn PluginRegistry>);

        let storage_factory = self
            .storage_factory
            .unwrap_or_else(|| Arc::new(SqliteStorageFactory::new(None)) as Arc<dyn StorageFactory>);

        let di = DiContainer::build();
        let embedder: Option<Arc<dyn EmbeddingProvider>> = if config.semantic.enabled {
            Some(self.embedder.unwrap_or_else(|| di.embedding_provider()))
        } else {
            None
        };

        let repository_id = repository_id_for(&root_path)?;
        let storage = storage_factory
            .open(repository_id, &root_path.to_string_lossy())
            .await?;

        let rate_limiter: Arc<dyn RateLimiterBackend> = Arc::new(InMemoryRateLimiter::new(
            config.embedder_rate_limit.max_requests_per_window,
            Duration::from_secs(config.embedder_rate_limit.window_secs),
            config.embedder_rate_limit.enabled,
        ));

        let workers = Arc::new(WorkerPool::new(config.worker_threads));
        let dispatcher = Arc::new(
            Dispatcher::with_timeout(registry, Duration::from_millis(config.plugin_timeout_ms))
                .with_workers(workers)
                .with_max_chunk_tokens(config.chunk_max_tokens),
        );
        let mut indexing_builder =
            IndexingService::new(dispatcher, config.max_file_size).with_rate_limiter(rate_limiter.clone());
        if let Some(embedder) = &embedder {
            indexing_builder = indexing_builder.with_embedder(embedder.clone());
        }
        let indexing = Arc::new(indexing_builder);
        let query = Arc::new(
            QueryEngine::new(storage.clone(), embedder)
                .with_alpha(config.rerank.alpha)
                .with_rate_limiter(rate_limiter),
        );

        let handler: Arc<dyn Handler> = Arc::new(
            McpHandler::new(storage.clone(), indexing.clone(), query, root_path.clone())
                .with_request_deadline(Duration::from_millis(config.request_deadline_ms)),
        );

        let watcher_service = Arc::new(WatcherService::new(indexing));
        watcher_service.register(repository_id, storage.clone(), root_path.clone());

        info!(root_path = %root_path.display(), "server components assembled");

        Ok(ServerComponents {
            handler,
            watcher_service,
            storage,
            root_path,
        })
    }
}

/// Start a background filesystem watcher over `root_path`, feeding events
/// into `watcher_service` until the returned handle is dropped.
pub fn spawn_watcher(
    watcher_service: Arc<WatcherService>,
    root_path: &Path,
    repository_id: crate::domain::types::RepositoryId,
    config: &Config,
) -> Result<crate::infrastructure::watcher::FileWatcher> {
    let watcher_config = WatcherConfig {
        debounce: Duration::from_millis(config.watch_debounce_ms),
        move_window: Duration::from_millis(config.move_window_ms),
        ..WatcherConfig::default()
    };
    let (watcher, events) = FileWatcher::start(root_path.to_path_buf(), repository_id, watcher_config)?;
    tokio::spawn(async move {
        watcher_service.run(events).await;
    });
    Ok(watcher)
}
