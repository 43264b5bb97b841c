//! Logical schema (spec §4.4): `repositories`, `files`, `symbols`, `chunks`,
//! a lexical full-text index, `embeddings`, `file_moves`, `schema_version`,
//! `migrations`.

/// DDL applied by migration 1, the only migration this implementation ships.
pub const MIGRATION_1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS migrations (
    version_from INTEGER NOT NULL,
    version_to INTEGER NOT NULL,
    status TEXT NOT NULL,
    applied_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS repositories (
    id TEXT PRIMARY KEY,
    root_path TEXT NOT NULL,
    schema_version INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    last_indexed_at INTEGER
);

CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repository_id TEXT NOT NULL,
    relative_path TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    language TEXT NOT NULL,
    size INTEGER NOT NULL,
    last_seen_at INTEGER NOT NULL,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    UNIQUE (repository_id, relative_path)
);

CREATE TABLE IF NOT EXISTS symbols (
    file_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    line_start INTEGER NOT NULL,
    line_end INTEGER NOT NULL,
    column_start INTEGER NOT NULL,
    signature TEXT,
    parent_symbol TEXT,
    visibility TEXT,
    modifiers TEXT,
    docstring TEXT,
    token_count INTEGER,
    symbol_hash TEXT NOT NULL,
    is_deleted INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_symbols_file_id ON symbols (file_id);
CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols (name);
CREATE INDEX IF NOT EXISTS idx_symbols_hash ON symbols (symbol_hash);

CREATE TABLE IF NOT EXISTS chunks (
    chunk_id TEXT NOT NULL,
    node_id TEXT NOT NULL,
    file_fingerprint_id TEXT NOT NULL,
    symbol_hash TEXT,
    definition_id TEXT,
    content TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    line_start INTEGER NOT NULL,
    line_end INTEGER NOT NULL,
    byte_start INTEGER NOT NULL,
    byte_end INTEGER NOT NULL,
    chunk_type TEXT NOT NULL,
    language TEXT NOT NULL,
    node_type TEXT NOT NULL,
    parent_chunk_id TEXT,
    depth INTEGER NOT NULL,
    chunk_index INTEGER NOT NULL,
    token_count INTEGER NOT NULL,
    tokenizer TEXT NOT NULL,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    UNIQUE (file_id, chunk_id)
);

CREATE INDEX IF NOT EXISTS idx_chunks_file_id ON chunks (file_id);
CREATE INDEX IF NOT EXISTS idx_chunks_chunk_id ON chunks (chunk_id);

CREATE VIRTUAL TABLE IF NOT EXISTS chunk_lexical_index USING fts5(
    chunk_id UNINDEXED,
    content,
    tokenize = 'porter unicode61'
);

CREATE TABLE IF NOT EXISTS embeddings (
    file_id INTEGER NOT NULL,
    chunk_id TEXT NOT NULL,
    model_name TEXT NOT NULL,
    model_dimension INTEGER NOT NULL,
    vector BLOB NOT NULL,
    UNIQUE (chunk_id, model_name)
);

CREATE TABLE IF NOT EXISTS file_moves (
    old_relative_path TEXT NOT NULL,
    new_relative_path TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    moved_at INTEGER NOT NULL,
    move_type TEXT NOT NULL
);
"#;
