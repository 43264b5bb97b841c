//! Shared fixtures for integration tests: a real SQLite-backed storage
//! engine rooted at a temp directory, wired to the same dispatcher/plugin
//! registry the server builds in production.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use codeindex_mcp::adapters::plugins::StaticPluginRegistry;
use codeindex_mcp::application::dispatcher::Dispatcher;
use codeindex_mcp::application::indexing::{repository_id_for, IndexingService};
use codeindex_mcp::application::query::QueryEngine;
use codeindex_mcp::domain::error::Result;
use codeindex_mcp::domain::ports::{EmbeddingProvider, StorageEngine, StorageFactory};
use codeindex_mcp::domain::types::RepositoryId;
use codeindex_mcp::infrastructure::storage::SqliteStorageFactory;
use codeindex_mcp::server::handler::McpHandler;
use tempfile::TempDir;

/// A fully wired engine over a throwaway repository directory. Kept alive
/// for the lifetime of the test so the temp dir and SQLite pool survive.
pub struct TestEngine {
    pub repo_dir: TempDir,
    pub repository_id: RepositoryId,
    pub storage: Arc<dyn StorageEngine>,
    pub indexing: Arc<IndexingService>,
    pub query: Arc<QueryEngine>,
    pub handler: Arc<McpHandler>,
}

impl TestEngine {
    pub fn root_path(&self) -> &Path {
        self.repo_dir.path()
    }

    pub async fn index(&self) -> Result<codeindex_mcp::application::indexing::IndexingSummary> {
        self.indexing.index_repository(self.storage.clone(), self.root_path()).await
    }

    pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let path = self.repo_dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, content).expect("write fixture file");
        path
    }
}

/// Build a test engine with the null embedder (no semantic search).
pub async fn build_engine() -> TestEngine {
    build_engine_with_embedder(None).await
}

/// Build a test engine with an explicit embedding provider wired into both
/// the indexing and query paths, as `server::builder` does when
/// `semantic.enabled` is true.
pub async fn build_engine_with_embedder(embedder: Option<Arc<dyn EmbeddingProvider>>) -> TestEngine {
    build_engine_with(embedder, None).await
}

/// Build a test engine with an explicit embedding provider and/or a
/// non-default per-request deadline, as `server::builder` applies from
/// `config.request_deadline_ms`.
pub async fn build_engine_with(embedder: Option<Arc<dyn EmbeddingProvider>>, request_deadline: Option<Duration>) -> TestEngine {
    let repo_dir = tempfile::tempdir().expect("create temp repo dir");
    let index_dir = tempfile::tempdir().expect("create temp index dir");

    let registry = StaticPluginRegistry::with_defaults() as Arc<dyn codeindex_mcp::domain::ports::PluginRegistry>;
    let dispatcher = Arc::new(Dispatcher::with_timeout(registry, Duration::from_millis(2_000)));

    let storage_factory = SqliteStorageFactory::new(Some(index_dir.path().to_path_buf()));
    let repository_id = repository_id_for_uncanonicalized(repo_dir.path());
    let storage = storage_factory
        .open(repository_id, &repo_dir.path().to_string_lossy())
        .await
        .expect("open storage");

    let mut indexing = IndexingService::new(dispatcher, 10 * 1024 * 1024);
    if let Some(embedder) = embedder.clone() {
        indexing = indexing.with_embedder(embedder);
    }
    let indexing = Arc::new(indexing);

    let query = Arc::new(QueryEngine::new(storage.clone(), embedder));

    let mut handler = McpHandler::new(storage.clone(), indexing.clone(), query.clone(), repo_dir.path().to_path_buf());
    if let Some(deadline) = request_deadline {
        handler = handler.with_request_deadline(deadline);
    }
    let handler = Arc::new(handler);

    TestEngine {
        repo_dir,
        repository_id,
        storage,
        indexing,
        query,
        handler,
    }
}

/// `repository_id_for` canonicalizes its argument, which requires the path
/// to exist; temp dirs always do, so this is just a thin non-fallible
/// wrapper kept local to avoid importing `std::fs::canonicalize` twice.
fn repository_id_for_uncanonicalized(root_path: &Path) -> RepositoryId {
    repository_id_for(root_path).expect("canonicalize temp repo dir")
}
