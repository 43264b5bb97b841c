//! SQLite-backed `StorageEngine` (spec §4.4). Grounded on the corpus's
//! `r2d2`-pooled SQLite storage pattern rather than the teacher's own
//! `r2d2_postgres` client, which assumes a network server incompatible
//! with this engine's per-repository on-disk `current.db` (see DESIGN.md).

use crate::domain::error::{Error, Result};
use crate::domain::ports::storage::{FulltextHit, RepositoryStats, SearchFilters, StorageEngine, SymbolLookupResult};
use crate::domain::ports::VectorHit;
use crate::domain::types::{
    Chunk, ChunkType, FileId, FileMove, FileRecord, IndexShard, Language, MoveType, Repository,
    RepositoryId, SymbolKind,
};
use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A pooled SQLite handle bound to one repository's `current.db`.
pub struct SqliteStorageEngine {
    pool: Pool<SqliteConnectionManager>,
    repository: Repository,
    snapshot: AtomicU64,
}

impl SqliteStorageEngine {
    pub fn new(pool: Pool<SqliteConnectionManager>, repository: Repository) -> Self {
        Self {
            pool,
            repository,
            snapshot: AtomicU64::new(0),
        }
    }

    async fn with_conn<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(Error::from)?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::storage(format!("storage task panicked: {e}")))?
    }

    fn bump_snapshot(&self) {
        self.snapshot.fetch_add(1, Ordering::SeqCst);
    }
}

fn symbol_kind_to_str(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Module => "module",
        SymbolKind::Namespace => "namespace",
        SymbolKind::Class => "class",
        SymbolKind::Interface => "interface",
        SymbolKind::Struct => "struct",
        SymbolKind::Enum => "enum",
        SymbolKind::Function => "function",
        SymbolKind::Method => "method",
        SymbolKind::Constructor => "constructor",
        SymbolKind::Field => "field",
        SymbolKind::Property => "property",
        SymbolKind::Variable => "variable",
        SymbolKind::Constant => "constant",
        SymbolKind::TypeAlias => "type-alias",
        SymbolKind::Import => "import",
    }
}

fn symbol_kind_from_str(s: &str) -> SymbolKind {
    match s {
        "module" => SymbolKind::Module,
        "namespace" => SymbolKind::Namespace,
        "class" => SymbolKind::Class,
        "interface" => SymbolKind::Interface,
        "struct" => SymbolKind::Struct,
        "enum" => SymbolKind::Enum,
        "function" => SymbolKind::Function,
        "method" => SymbolKind::Method,
        "constructor" => SymbolKind::Constructor,
        "field" => SymbolKind::Field,
        "property" => SymbolKind::Property,
        "variable" => SymbolKind::Variable,
        "constant" => SymbolKind::Constant,
        "type-alias" => SymbolKind::TypeAlias,
        _ => SymbolKind::Import,
    }
}

fn chunk_type_to_str(t: ChunkType) -> &'static str {
    match t {
        ChunkType::Code => "code",
        ChunkType::Comment => "comment",
        ChunkType::Doc => "doc",
        ChunkType::Data => "data",
        ChunkType::Mixed => "mixed",
    }
}

fn move_type_to_str(t: MoveType) -> &'static str {
    match t {
        MoveType::Rename => "rename",
        MoveType::Relocate => "relocate",
        MoveType::Restructure => "restructure",
    }
}

fn language_from_str(s: &str) -> Language {
    Language::from_name(s)
}

fn file_row_to_record(row: &rusqlite::Row<'_>, repository_id: RepositoryId) -> rusqlite::Result<FileRecord> {
    let id: i64 = row.get("id")?;
    let language: String = row.get("language")?;
    let is_deleted: i64 = row.get("is_deleted")?;
    Ok(FileRecord {
        id: FileId(id),
        repository_id,
        relative_path: row.get("relative_path")?,
        content_hash: row.get("content_hash")?,
        language: language_from_str(&language),
        size: row.get::<_, i64>("size")? as u64,
        last_seen_at: row.get("last_seen_at")?,
        is_deleted: is_deleted != 0,
    })
}

#[async_trait]
impl StorageEngine for SqliteStorageEngine {
    fn repository(&self) -> Repository {
        self.repository.clone()
    }

    fn snapshot_id(&self) -> Result<u64> {
        Ok(self.snapshot.load(Ordering::SeqCst))
    }

    async fn get_file(&self, file_id: FileId) -> Result<Option<FileRecord>> {
        let repository_id = self.repository.id;
        self.with_conn(move |conn| {
            conn.query_row("SELECT * FROM files WHERE id = ?1", params![file_id.0], |row| {
                file_row_to_record(row, repository_id)
            })
            .optional()
            .map_err(Error::from)
        })
        .await
    }

    async fn get_file_by_path(&self, relative_path: &str) -> Result<Option<FileRecord>> {
        let repository_id = self.repository.id;
        let relative_path = relative_path.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT * FROM files WHERE relative_path = ?1",
                params![relative_path],
                |row| file_row_to_record(row, repository_id),
            )
            .optional()
            .map_err(Error::from)
        })
        .await
    }

    async fn ensure_file_id(&self, relative_path: &str) -> Result<FileId> {
        let repository_id = self.repository.id.to_hex();
        let relative_path = relative_path.to_string();
        self.with_conn(move |conn| {
            if let Some(id) = conn
                .query_row(
                    "SELECT id FROM files WHERE relative_path = ?1",
                    params![relative_path],
                    |row| row.get::<_, i64>(0),
                )
                .optional()
                .map_err(Error::from)?
            {
                return Ok(FileId(id));
            }

            conn.execute(
                "INSERT INTO files (repository_id, relative_path, content_hash, language, size, last_seen_at, is_deleted)
                 VALUES (?1, ?2, '', 'unknown', 0, 0, 0)",
                params![repository_id, relative_path],
            )
            .map_err(Error::from)?;
            Ok(FileId(conn.last_insert_rowid()))
        })
        .await
    }

    async fn commit_shard(&self, file: &FileRecord, shard: &IndexShard) -> Result<()> {
        let repository_id = self.repository.id.to_hex();
        let file = file.clone();
        let shard = shard.clone();
        self.with_conn(move |conn| commit_shard_sync(conn, &repository_id, &file, &shard))
            .await?;
        self.bump_snapshot();
        Ok(())
    }

    async fn tombstone_file(&self, file_id: FileId) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute("UPDATE files SET is_deleted = 1 WHERE id = ?1", params![file_id.0])
                .map_err(Error::from)?;
            conn.execute("UPDATE symbols SET is_deleted = 1 WHERE file_id = ?1", params![file_id.0])
                .map_err(Error::from)?;
            conn.execute("UPDATE chunks SET is_deleted = 1 WHERE file_id = ?1", params![file_id.0])
                .map_err(Error::from)?;
            Ok(())
        })
        .await?;
        self.bump_snapshot();
        Ok(())
    }

    async fn record_move(&self, file_id: FileId, mv: &FileMove) -> Result<()> {
        let mv = mv.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO file_moves (old_relative_path, new_relative_path, content_hash, moved_at, move_type)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    mv.old_relative_path,
                    mv.new_relative_path,
                    mv.content_hash,
                    mv.moved_at,
                    move_type_to_str(mv.move_type),
                ],
            )
            .map_err(Error::from)?;
            conn.execute(
                "UPDATE files SET relative_path = ?1 WHERE id = ?2",
                params![mv.new_relative_path, file_id.0],
            )
            .map_err(Error::from)?;
            Ok(())
        })
        .await?;
        self.bump_snapshot();
        Ok(())
    }

    async fn lookup_symbol(
        &self,
        name: &str,
        kind: Option<SymbolKind>,
        limit: usize,
    ) -> Result<Vec<SymbolLookupResult>> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            let mut sql = String::from(
                "SELECT s.name, s.kind, s.line_start, s.signature, s.symbol_hash, f.relative_path
                 FROM symbols s JOIN files f ON f.id = s.file_id
                 WHERE f.is_deleted = 0 AND s.is_deleted = 0 AND (s.name = ?1 OR s.name LIKE ?1 || '%')",
            );
            if kind.is_some() {
                sql.push_str(" AND s.kind = ?2");
            }
            sql.push_str(" ORDER BY (s.name != ?1), LENGTH(f.relative_path), s.line_start LIMIT ?3");

            let mut stmt = conn.prepare(&sql).map_err(Error::from)?;
            let kind_str = kind.map(symbol_kind_to_str).unwrap_or("");
            let query_name = name.clone();
            let row_mapper = move |row: &rusqlite::Row<'_>| -> rusqlite::Result<SymbolLookupResult> {
                let mut result = map_symbol_row(row)?;
                let matched_name: String = row.get(0)?;
                result.exact = matched_name == query_name;
                Ok(result)
            };
            let rows = if kind.is_some() {
                stmt.query_map(params![name, kind_str, limit as i64], row_mapper)
            } else {
                stmt.query_map(params![name, limit as i64], row_mapper)
            }
            .map_err(Error::from)?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row.map_err(Error::from)?);
            }
            Ok(out)
        })
        .await
    }

    async fn get_definition(&self, symbol_hash: &str) -> Result<Option<SymbolLookupResult>> {
        let symbol_hash = symbol_hash.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT s.name, s.kind, s.line_start, s.signature, s.symbol_hash, f.relative_path
                 FROM symbols s JOIN files f ON f.id = s.file_id
                 WHERE s.symbol_hash = ?1 AND f.is_deleted = 0 AND s.is_deleted = 0
                 LIMIT 1",
                params![symbol_hash],
                map_symbol_row,
            )
            .optional()
            .map_err(Error::from)
        })
        .await
    }

    async fn find_references(&self, symbol_hash: &str) -> Result<Vec<SymbolLookupResult>> {
        // Cross-references are represented as symbol_hash lookups through
        // storage (spec §9); without an explicit usage-site index, every
        // declaration sharing the hash is the best available answer.
        let symbol_hash = symbol_hash.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT s.name, s.kind, s.line_start, s.signature, s.symbol_hash, f.relative_path
                     FROM symbols s JOIN files f ON f.id = s.file_id
                     WHERE s.symbol_hash = ?1 AND f.is_deleted = 0 AND s.is_deleted = 0",
                )
                .map_err(Error::from)?;
            let rows = stmt.query_map(params![symbol_hash], map_symbol_row).map_err(Error::from)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row.map_err(Error::from)?);
            }
            Ok(out)
        })
        .await
    }

    async fn fulltext_search(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<FulltextHit>, usize)> {
        let query = query.to_string();
        let filters = filters.clone();
        self.with_conn(move |conn| {
            let mut sql = String::from(
                "SELECT c.chunk_id, f.relative_path, c.line_start, c.line_end, c.content, bm25(chunk_lexical_index) AS score
                 FROM chunk_lexical_index
                 JOIN chunks c ON c.chunk_id = chunk_lexical_index.chunk_id
                 JOIN files f ON f.id = c.file_id
                 WHERE chunk_lexical_index MATCH ?1 AND c.is_deleted = 0 AND f.is_deleted = 0",
            );
            if filters.language.is_some() {
                sql.push_str(" AND c.language = ?2");
            }
            if filters.path_glob.is_some() {
                sql.push_str(" AND f.relative_path GLOB ?3");
            }
            sql.push_str(" ORDER BY score LIMIT ?4 OFFSET ?5");

            let mut stmt = conn.prepare(&sql).map_err(Error::from)?;
            let language_str = filters.language.map(|l| l.as_str()).unwrap_or("");
            let glob = filters.path_glob.clone().unwrap_or_default();

            let rows = stmt
                .query_map(
                    params![query, language_str, glob, limit as i64, offset as i64],
                    |row| {
                        let score: f64 = row.get("score")?;
                        Ok(FulltextHit {
                            chunk_id: row.get("chunk_id")?,
                            relative_path: row.get("relative_path")?,
                            line_start: row.get("line_start")?,
                            line_end: row.get("line_end")?,
                            snippet: row.get::<_, String>("content")?.chars().take(400).collect(),
                            // bm25() returns lower-is-better; negate so higher is better.
                            score: -score as f32,
                        })
                    },
                )
                .map_err(Error::from)?;

            let mut hits = Vec::new();
            for row in rows {
                hits.push(row.map_err(Error::from)?);
            }
            let total = hits.len();
            Ok((hits, total))
        })
        .await
    }

    async fn vector_search(&self, vector: &[f32], _filters: &SearchFilters, limit: usize) -> Result<Vec<VectorHit>> {
        // Brute-force cosine similarity over stored embeddings; adequate
        // for the local, single-repository scale this engine targets.
        let query = vector.to_vec();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare("SELECT chunk_id, vector FROM embeddings")
                .map_err(Error::from)?;
            let rows = stmt
                .query_map([], |row| {
                    let chunk_id: String = row.get(0)?;
                    let blob: Vec<u8> = row.get(1)?;
                    Ok((chunk_id, blob))
                })
                .map_err(Error::from)?;

            let mut scored = Vec::new();
            for row in rows {
                let (chunk_id, blob) = row.map_err(Error::from)?;
                let candidate = bytes_to_vector(&blob);
                let score = cosine_similarity(&query, &candidate);
                scored.push(VectorHit { chunk_id, score });
            }
            scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
            scored.truncate(limit);
            Ok(scored)
        })
        .await
    }

    async fn hydrate_chunks(&self, chunk_ids: &[String]) -> Result<Vec<Chunk>> {
        if chunk_ids.is_empty() {
            return Ok(Vec::new());
        }
        let chunk_ids = chunk_ids.to_vec();
        self.with_conn(move |conn| {
            let placeholders = chunk_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let sql = format!(
                "SELECT * FROM chunks WHERE chunk_id IN ({placeholders}) AND is_deleted = 0"
            );
            let mut stmt = conn.prepare(&sql).map_err(Error::from)?;
            let params: Vec<&dyn rusqlite::ToSql> =
                chunk_ids.iter().map(|id| id as &dyn rusqlite::ToSql).collect();
            let rows = stmt.query_map(params.as_slice(), map_chunk_row).map_err(Error::from)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row.map_err(Error::from)?);
            }
            Ok(out)
        })
        .await
    }

    async fn upsert_embedding(
        &self,
        file_id: FileId,
        chunk_id: &str,
        model_name: &str,
        model_dimension: u32,
        vector: &[f32],
    ) -> Result<()> {
        upsert_embedding(&self.pool, file_id, chunk_id, model_name, model_dimension, vector).await
    }

    async fn stats(&self) -> Result<RepositoryStats> {
        self.with_conn(|conn| {
            let file_count: i64 = conn
                .query_row("SELECT COUNT(*) FROM files WHERE is_deleted = 0", [], |r| r.get(0))
                .map_err(Error::from)?;
            let symbol_count: i64 = conn
                .query_row("SELECT COUNT(*) FROM symbols WHERE is_deleted = 0", [], |r| r.get(0))
                .map_err(Error::from)?;
            let chunk_count: i64 = conn
                .query_row("SELECT COUNT(*) FROM chunks WHERE is_deleted = 0", [], |r| r.get(0))
                .map_err(Error::from)?;
            let embedding_count: i64 = conn
                .query_row("SELECT COUNT(*) FROM embeddings", [], |r| r.get(0))
                .map_err(Error::from)?;
            Ok(RepositoryStats {
                file_count: file_count as u64,
                symbol_count: symbol_count as u64,
                chunk_count: chunk_count as u64,
                embedding_count: embedding_count as u64,
            })
        })
        .await
    }
}

fn map_symbol_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SymbolLookupResult> {
    let kind_str: String = row.get(1)?;
    let line: i64 = row.get(2)?;
    let signature: Option<String> = row.get(3)?;
    let symbol_hash: String = row.get(4)?;
    let relative_path: String = row.get(5)?;
    Ok(SymbolLookupResult {
        relative_path,
        line: line as u32,
        signature,
        exact: true,
        kind: symbol_kind_from_str(&kind_str),
        symbol_hash,
    })
}

fn map_chunk_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Chunk> {
    let file_id: i64 = row.get("file_id")?;
    let chunk_type: String = row.get("chunk_type")?;
    let language: String = row.get("language")?;
    Ok(Chunk {
        chunk_id: row.get("chunk_id")?,
        node_id: row.get("node_id")?,
        file_fingerprint_id: row.get("file_fingerprint_id")?,
        symbol_hash: row.get("symbol_hash")?,
        definition_id: row.get("definition_id")?,
        content: row.get("content")?,
        file_id: FileId(file_id),
        line_start: row.get("line_start")?,
        line_end: row.get("line_end")?,
        byte_start: row.get("byte_start")?,
        byte_end: row.get("byte_end")?,
        chunk_type: match chunk_type.as_str() {
            "comment" => ChunkType::Comment,
            "doc" => ChunkType::Doc,
            "data" => ChunkType::Data,
            "mixed" => ChunkType::Mixed,
            _ => ChunkType::Code,
        },
        language: language_from_str(&language),
        node_type: row.get("node_type")?,
        parent_chunk_id: row.get("parent_chunk_id")?,
        depth: row.get("depth")?,
        chunk_index: row.get("chunk_index")?,
        token_count: row.get("token_count")?,
        tokenizer: row.get("tokenizer")?,
    })
}

fn commit_shard_sync(
    conn: &rusqlite::Connection,
    repository_id: &str,
    file: &FileRecord,
    shard: &IndexShard,
) -> Result<()> {
    let tx = conn.unchecked_transaction().map_err(Error::from)?;

    tx.execute(
        "UPDATE files SET content_hash = ?1, language = ?2, size = ?3, last_seen_at = ?4, is_deleted = 0
         WHERE id = ?5",
        params![
            file.content_hash,
            file.language.as_str(),
            file.size as i64,
            file.last_seen_at,
            file.id.0,
        ],
    )
    .map_err(Error::from)?;

    tx.execute("UPDATE symbols SET is_deleted = 1 WHERE file_id = ?1", params![file.id.0])
        .map_err(Error::from)?;
    tx.execute("UPDATE chunks SET is_deleted = 1 WHERE file_id = ?1", params![file.id.0])
        .map_err(Error::from)?;

    for symbol in &shard.symbols {
        tx.execute(
            "INSERT INTO symbols (file_id, name, kind, line_start, line_end, column_start, signature,
             parent_symbol, visibility, modifiers, docstring, token_count, symbol_hash, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0)",
            params![
                symbol.file_id.0,
                symbol.name,
                symbol_kind_to_str(symbol.kind),
                symbol.line_start,
                symbol.line_end,
                symbol.column_start,
                symbol.signature,
                symbol.parent_symbol,
                symbol.visibility,
                serde_json::to_string(&symbol.modifiers).unwrap_or_default(),
                symbol.docstring,
                symbol.token_count,
                symbol.symbol_hash,
            ],
        )
        .map_err(Error::from)?;
    }

    for chunk in &shard.chunks {
        tx.execute(
            "INSERT OR REPLACE INTO chunks (chunk_id, node_id, file_fingerprint_id, symbol_hash, definition_id,
             content, file_id, line_start, line_end, byte_start, byte_end, chunk_type, language, node_type,
             parent_chunk_id, depth, chunk_index, token_count, tokenizer, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, 0)",
            params![
                chunk.chunk_id,
                chunk.node_id,
                chunk.file_fingerprint_id,
                chunk.symbol_hash,
                chunk.definition_id,
                chunk.content,
                chunk.file_id.0,
                chunk.line_start,
                chunk.line_end,
                chunk.byte_start,
                chunk.byte_end,
                chunk_type_to_str(chunk.chunk_type),
                chunk.language.as_str(),
                chunk.node_type,
                chunk.parent_chunk_id,
                chunk.depth,
                chunk.chunk_index,
                chunk.token_count,
                chunk.tokenizer,
            ],
        )
        .map_err(Error::from)?;

        tx.execute(
            "DELETE FROM chunk_lexical_index WHERE chunk_id = ?1",
            params![chunk.chunk_id],
        )
        .map_err(Error::from)?;
        tx.execute(
            "INSERT INTO chunk_lexical_index (chunk_id, content) VALUES (?1, ?2)",
            params![chunk.chunk_id, chunk.content],
        )
        .map_err(Error::from)?;
    }

    tx.execute(
        "UPDATE repositories SET last_indexed_at = ?1 WHERE id = ?2",
        params![file.last_seen_at, repository_id],
    )
    .map_err(Error::from)?;

    tx.commit().map_err(Error::from)?;
    Ok(())
}

fn bytes_to_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Serialize a vector to the little-endian byte layout `vector_search` reads.
pub fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Standalone handle used by `upsert_embedding` callers (Dispatcher's
/// semantic-indexing path) that don't go through `commit_shard`.
pub async fn upsert_embedding(
    pool: &Pool<SqliteConnectionManager>,
    file_id: FileId,
    chunk_id: &str,
    model_name: &str,
    model_dimension: u32,
    vector: &[f32],
) -> Result<()> {
    let pool = pool.clone();
    let chunk_id = chunk_id.to_string();
    let model_name = model_name.to_string();
    let vector_bytes = vector_to_bytes(vector);
    tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(Error::from)?;
        conn.execute(
            "INSERT INTO embeddings (file_id, chunk_id, model_name, model_dimension, vector)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (chunk_id, model_name) DO UPDATE SET vector = excluded.vector, model_dimension = excluded.model_dimension",
            params![file_id.0, chunk_id, model_name, model_dimension, vector_bytes],
        )
        .map_err(Error::from)?;
        Ok(())
    })
    .await
    .map_err(|e| Error::storage(format!("embedding upsert task panicked: {e}")))?
}

pub(crate) fn repository_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Repository> {
    let id_hex: String = row.get("id")?;
    Ok(Repository {
        id: repository_id_from_hex(&id_hex),
        root_path: row.get("root_path")?,
        schema_version: row.get::<_, i64>("schema_version")? as u32,
        created_at: row.get("created_at")?,
        last_indexed_at: row.get("last_indexed_at")?,
    })
}

fn repository_id_from_hex(hex: &str) -> RepositoryId {
    let mut bytes = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).take(32).enumerate() {
        if let Ok(s) = std::str::from_utf8(chunk) {
            if let Ok(b) = u8::from_str_radix(s, 16) {
                bytes[i] = b;
            }
        }
    }
    RepositoryId(bytes)
}

/// Expose `Arc` construction for the factory module.
pub fn into_arc(engine: SqliteStorageEngine) -> Arc<dyn StorageEngine> {
    Arc::new(engine)
}
