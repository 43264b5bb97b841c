//! On-disk layout and index discovery (spec §6): `current.db`, `embeddings/`,
//! `metadata.json`, `.moves.log`, searched at `./.mcp-index/`, a per-user
//! cache directory, then the `INDEX_PATH` configuration key.

use super::engine::SqliteStorageEngine;
use crate::domain::error::{Error, Result};
use crate::domain::ports::storage::{RepositoryStats, StorageEngine, StorageFactory};
use crate::domain::types::{Repository, RepositoryId};
use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// `metadata.json` contents: repository identity and aggregate counts,
/// refreshed on every `open`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Metadata {
    repository_id: String,
    root_path: String,
    schema_version: u32,
    created_at: i64,
    last_indexed_at: Option<i64>,
    #[serde(default)]
    stats: RepositoryStats,
}

/// Opens SQLite-backed storage handles, creating the on-disk layout on first
/// use and following the discovery order an explicit `INDEX_PATH` overrides.
pub struct SqliteStorageFactory {
    /// Explicit override (`INDEX_PATH` config key); takes precedence when set.
    index_path_override: Option<PathBuf>,
}

impl SqliteStorageFactory {
    pub fn new(index_path_override: Option<PathBuf>) -> Self {
        Self { index_path_override }
    }

    /// Resolve the index directory for `root_path`, in discovery order:
    /// `./.mcp-index/`, then a per-user cache directory keyed by the path's
    /// hash, then `INDEX_PATH` if configured. The first with a `metadata.json`
    /// wins; absent any, the in-repo `.mcp-index/` directory is created.
    fn resolve_index_dir(&self, repository_id: RepositoryId, root_path: &Path) -> Result<PathBuf> {
        let in_repo = root_path.join(".mcp-index");
        if in_repo.join("metadata.json").is_file() {
            return Ok(in_repo);
        }

        if let Some(cache_dir) = Self::user_cache_dir(repository_id) {
            if cache_dir.join("metadata.json").is_file() {
                return Ok(cache_dir);
            }
        }

        if let Some(explicit) = &self.index_path_override {
            if explicit.join("metadata.json").is_file() {
                return Ok(explicit.clone());
            }
        }

        if let Some(explicit) = &self.index_path_override {
            return Ok(explicit.clone());
        }

        Self::user_cache_dir(repository_id)
            .ok_or_else(|| Error::storage("no cache directory available for index storage"))
    }

    fn user_cache_dir(repository_id: RepositoryId) -> Option<PathBuf> {
        dirs::cache_dir().map(|base| base.join("codeindex-mcp").join(repository_id.to_hex()))
    }

    #[instrument(skip(self), fields(repository_id = %repository_id))]
    async fn open_inner(&self, repository_id: RepositoryId, root_path: &str) -> Result<Arc<dyn StorageEngine>> {
        let root = PathBuf::from(root_path);
        let index_dir = self.resolve_index_dir(repository_id, &root)?;
        std::fs::create_dir_all(&index_dir)?;
        std::fs::create_dir_all(index_dir.join("embeddings"))?;

        let manager = SqliteConnectionManager::file(index_dir.join("current.db"))
            .with_init(|conn| conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;"));
        let pool = Pool::new(manager).map_err(Error::from)?;

        let bootstrap_pool = pool.clone();
        let index_dir_for_blocking = index_dir.clone();
        let root_path_owned = root_path.to_string();
        let repository = tokio::task::spawn_blocking(move || -> Result<Repository> {
            let mut conn = bootstrap_pool.get().map_err(Error::from)?;
            super::migrations::run_pending(&mut conn)?;
            let repository = load_or_create_repository(&conn, repository_id, &root_path_owned)?;
            write_metadata(&index_dir_for_blocking, &repository, RepositoryStats::default())?;
            Ok(repository)
        })
        .await
        .map_err(|e| Error::storage(format!("storage open task panicked: {e}")))??;

        info!(root_path, index_dir = %index_dir.display(), "storage index opened");
        Ok(Arc::new(SqliteStorageEngine::new(pool, repository)))
    }
}

#[async_trait]
impl StorageFactory for SqliteStorageFactory {
    async fn open(&self, repository_id: RepositoryId, root_path: &str) -> Result<Arc<dyn StorageEngine>> {
        self.open_inner(repository_id, root_path).await
    }
}

fn load_or_create_repository(conn: &rusqlite::Connection, repository_id: RepositoryId, root_path: &str) -> Result<Repository> {
    let id_hex = repository_id.to_hex();
    let existing = conn
        .query_row(
            "SELECT id, root_path, schema_version, created_at, last_indexed_at FROM repositories WHERE id = ?1",
            rusqlite::params![id_hex],
            |row| {
                Ok(Repository {
                    id: repository_id,
                    root_path: row.get(1)?,
                    schema_version: row.get::<_, i64>(2)? as u32,
                    created_at: row.get(3)?,
                    last_indexed_at: row.get(4)?,
                })
            },
        )
        .map_err(rusqlite::Error::from);

    match existing {
        Ok(repo) => Ok(repo),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            let created_at = chrono::Utc::now().timestamp();
            conn.execute(
                "INSERT INTO repositories (id, root_path, schema_version, created_at, last_indexed_at)
                 VALUES (?1, ?2, ?3, ?4, NULL)",
                rusqlite::params![id_hex, root_path, crate::domain::constants::CURRENT_SCHEMA_VERSION, created_at],
            )
            .map_err(Error::from)?;
            Ok(Repository {
                id: repository_id,
                root_path: root_path.to_string(),
                schema_version: crate::domain::constants::CURRENT_SCHEMA_VERSION,
                created_at,
                last_indexed_at: None,
            })
        }
        Err(err) => Err(Error::from(err)),
    }
}

fn write_metadata(index_dir: &Path, repository: &Repository, stats: RepositoryStats) -> Result<()> {
    let metadata = Metadata {
        repository_id: repository.id.to_hex(),
        root_path: repository.root_path.clone(),
        schema_version: repository.schema_version,
        created_at: repository.created_at,
        last_indexed_at: repository.last_indexed_at,
        stats,
    };
    let json = serde_json::to_string_pretty(&metadata).map_err(Error::from)?;
    std::fs::write(index_dir.join("metadata.json"), json)?;
    Ok(())
}

/// Refresh `metadata.json` with current aggregate counts. Called after a
/// commit so the on-disk metadata stays close to the live database without
/// requiring every writer to know the index directory.
pub async fn refresh_metadata(index_dir: &Path, repository: &Repository, stats: RepositoryStats) -> Result<()> {
    let index_dir = index_dir.to_path_buf();
    let repository = repository.clone();
    tokio::task::spawn_blocking(move || write_metadata(&index_dir, &repository, stats))
        .await
        .map_err(|e| Error::storage(format!("metadata refresh task panicked: {e}")))?
}

/// Append one line to `.moves.log` for audit (spec §6).
pub async fn append_move_log(index_dir: &Path, line: &str) -> Result<()> {
    use std::io::Write;
    let index_dir = index_dir.to_path_buf();
    let line = line.to_string();
    tokio::task::spawn_blocking(move || {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(index_dir.join(".moves.log"))?;
        writeln!(file, "{line}")?;
        Ok::<(), std::io::Error>(())
    })
    .await
    .map_err(|e| Error::storage(format!("move log task panicked: {e}")))?
    .map_err(Error::from)
}
