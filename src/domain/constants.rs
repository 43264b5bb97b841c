//! Shared numeric and string constants referenced across layers.

/// Current on-disk schema version. Bump alongside a new migration.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Name of the tokenizer persisted on every chunk.
pub const TOKENIZER_NAME: &str = "cl100k_base";

/// Default maximum tokens per chunk before the chunker splits further.
pub const DEFAULT_MAX_CHUNK_TOKENS: u32 = 400;

/// Minimum chunk content length (bytes) below which a fallback chunk is dropped.
pub const MIN_FALLBACK_CHUNK_LEN: usize = 20;

/// Default per-plugin parse timeout, in milliseconds.
pub const DEFAULT_PLUGIN_TIMEOUT_MS: u64 = 5_000;

/// Default per-request query deadline, in milliseconds.
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 2_000;

/// Default hybrid search weighting of lexical vs. semantic score.
pub const DEFAULT_HYBRID_ALPHA: f32 = 0.5;

/// Default debounce window for file watcher events, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default circuit breaker failure threshold before opening.
pub const DEFAULT_CIRCUIT_BREAKER_FAILURE_THRESHOLD: u32 = 5;

/// Default circuit breaker open-state cooldown, in milliseconds.
pub const DEFAULT_CIRCUIT_BREAKER_RESET_MS: u64 = 30_000;

/// Name of the on-disk index file within a repository's index directory.
pub const INDEX_FILE_NAME: &str = "current.db";

/// Name of the per-machine index root directory, relative to the data dir.
pub const INDEX_ROOT_DIR_NAME: &str = "repos";
