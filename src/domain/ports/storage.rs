//! Storage Engine contract (spec §4.4).
//!
//! Covers both the read API the Query Engine uses and the write API the
//! Dispatcher uses to commit shards. A single trait mirrors the spec's
//! framing of "Storage Engine" as one component; concrete storage lives in
//! `infrastructure::storage`.

use super::vector_store::VectorHit;
use crate::domain::error::Result;
use crate::domain::types::{
    Chunk, FileId, FileMove, FileRecord, IndexShard, Language, Repository, RepositoryId,
    SymbolKind,
};
use async_trait::async_trait;

/// One symbol lookup hit.
#[derive(Debug, Clone)]
pub struct SymbolLookupResult {
    /// File the symbol is declared in.
    pub relative_path: String,
    /// 1-based declaration line.
    pub line: u32,
    /// Declaration signature, if known.
    pub signature: Option<String>,
    /// Cross-reference key for `get_definition`/`find_references`.
    pub symbol_hash: String,
    /// Whether this result was an exact name match (vs. prefix match).
    pub exact: bool,
    /// Declaration kind, used for result ordering.
    pub kind: SymbolKind,
}

/// One full-text search hit.
#[derive(Debug, Clone)]
pub struct FulltextHit {
    /// Matched chunk.
    pub chunk_id: String,
    /// File the chunk belongs to.
    pub relative_path: String,
    /// Line range of the chunk.
    pub line_start: u32,
    pub line_end: u32,
    /// Highest-scoring window of the chunk, not exceeding the configured
    /// snippet token budget.
    pub snippet: String,
    /// BM25 score.
    pub score: f32,
}

/// Filters applicable to lexical and semantic search (spec §4.6).
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Glob restricting matched file paths.
    pub path_glob: Option<String>,
    /// Restrict to a single language.
    pub language: Option<Language>,
    /// Restrict to chunks overlapping a symbol of this kind.
    pub symbol_kind: Option<SymbolKind>,
}

/// Persistence boundary for one repository's index.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// The repository this handle is bound to.
    fn repository(&self) -> Repository;

    /// Monotonic version of the repository's indexed state, used by
    /// callers to detect drift across paginated queries.
    fn snapshot_id(&self) -> Result<u64>;

    /// Look up a file by its stable id.
    async fn get_file(&self, file_id: FileId) -> Result<Option<FileRecord>>;

    /// Look up a file by its repository-relative path.
    async fn get_file_by_path(&self, relative_path: &str) -> Result<Option<FileRecord>>;

    /// Return the stable id for `relative_path`, creating a placeholder row
    /// if none exists yet. Callers use the returned id to stamp chunks and
    /// symbols before the shard that fills in their content is committed.
    async fn ensure_file_id(&self, relative_path: &str) -> Result<FileId>;

    /// Atomically replace the shard owned by a file: tombstone the old
    /// symbols/chunks and insert the new ones in one transaction.
    async fn commit_shard(&self, file: &FileRecord, shard: &IndexShard) -> Result<()>;

    /// Soft-delete a file: tombstone its symbols/chunks but keep their rows
    /// until compaction.
    async fn tombstone_file(&self, file_id: FileId) -> Result<()>;

    /// Record a detected rename, preserving `file_id` continuity.
    async fn record_move(&self, file_id: FileId, mv: &FileMove) -> Result<()>;

    /// Exact/prefix symbol lookup, ordered per spec §4.6.
    async fn lookup_symbol(
        &self,
        name: &str,
        kind: Option<SymbolKind>,
        limit: usize,
    ) -> Result<Vec<SymbolLookupResult>>;

    /// Resolve a symbol hash to its canonical declaration location.
    async fn get_definition(&self, symbol_hash: &str) -> Result<Option<SymbolLookupResult>>;

    /// All declaration sites referencing a qualified name (by symbol hash).
    async fn find_references(&self, symbol_hash: &str) -> Result<Vec<SymbolLookupResult>>;

    /// BM25 full-text search over the chunk index.
    async fn fulltext_search(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<FulltextHit>, usize)>;

    /// Nearest-neighbor search over the vector index.
    async fn vector_search(
        &self,
        vector: &[f32],
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<VectorHit>>;

    /// Fetch full chunk rows for a set of ids, preserving no particular order.
    async fn hydrate_chunks(&self, chunk_ids: &[String]) -> Result<Vec<Chunk>>;

    /// Store (or replace) the embedding for one chunk under one model.
    /// Invariant 3 (spec §8): at most one row per `(chunk_id, model_name)`.
    async fn upsert_embedding(
        &self,
        file_id: FileId,
        chunk_id: &str,
        model_name: &str,
        model_dimension: u32,
        vector: &[f32],
    ) -> Result<()>;

    /// Aggregate counts for `metadata.json` and `get_status`.
    async fn stats(&self) -> Result<RepositoryStats>;
}

/// Aggregate counts surfaced by `get_status` and `metadata.json`.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct RepositoryStats {
    pub file_count: u64,
    pub symbol_count: u64,
    pub chunk_count: u64,
    pub embedding_count: u64,
}

/// Factory for opening a repository's storage handle, running migrations as
/// needed (spec §4.4, §6 index discovery).
#[async_trait]
pub trait StorageFactory: Send + Sync {
    /// Open (creating if absent) the index for `repository_id` rooted at
    /// `root_path`, applying any pending migrations.
    async fn open(
        &self,
        repository_id: RepositoryId,
        root_path: &str,
    ) -> Result<std::sync::Arc<dyn StorageEngine>>;
}
