//! The configuration surface recognized by the engine (spec §6).

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Semantic search provider selection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SemanticConfig {
    /// Whether semantic search is attempted at all.
    #[serde(default)]
    pub enabled: bool,
    /// Embedding model name, persisted alongside vectors.
    #[serde(default = "default_semantic_model")]
    pub model: String,
    /// Declared output dimensionality of `model`.
    #[serde(default = "default_semantic_dimension")]
    #[validate(range(min = 1))]
    pub dimension: u32,
}

fn default_semantic_model() -> String {
    "null".to_string()
}

fn default_semantic_dimension() -> u32 {
    1
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_semantic_model(),
            dimension: default_semantic_dimension(),
        }
    }
}

/// Hybrid search weighting.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RerankConfig {
    /// Weight given to the lexical score; `(1 - alpha)` goes to semantic.
    #[serde(default = "default_alpha")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub alpha: f32,
}

fn default_alpha() -> f32 {
    crate::domain::constants::DEFAULT_HYBRID_ALPHA
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self { alpha: default_alpha() }
    }
}

/// Per-key throttling applied to embedder calls (spec §5).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmbedderRateLimitConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_rate_limit_requests")]
    #[validate(range(min = 1))]
    pub max_requests_per_window: u32,
    #[serde(default = "default_rate_limit_window_secs")]
    #[validate(range(min = 1))]
    pub window_secs: u64,
}

fn default_rate_limit_requests() -> u32 {
    60
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

impl Default for EmbedderRateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_requests_per_window: default_rate_limit_requests(),
            window_secs: default_rate_limit_window_secs(),
        }
    }
}

/// Full configuration surface (spec §6). Deserialized by `ConfigLoader`
/// from embedded defaults, an optional TOML file, and environment
/// overrides, in that precedence order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Files larger than this are indexed as a single raw chunk.
    #[serde(default = "default_max_file_size")]
    #[validate(range(min = 1))]
    pub max_file_size: u64,

    /// Upper bound on tokens per chunk body.
    #[serde(default = "default_chunk_max_tokens")]
    #[validate(range(min = 1))]
    pub chunk_max_tokens: u32,

    /// Watcher debounce window.
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,

    /// Window within which a delete+create pair is treated as a rename.
    #[serde(default = "default_move_window_ms")]
    pub move_window_ms: u64,

    /// Per-plugin wall-clock budget.
    #[serde(default = "default_plugin_timeout_ms")]
    pub plugin_timeout_ms: u64,

    /// Per-request deadline enforced at the Handler boundary.
    #[serde(default = "default_request_deadline_ms")]
    pub request_deadline_ms: u64,

    /// Gitignore-syntax patterns suppressing build artefacts.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Semantic search provider selection.
    #[serde(default)]
    #[validate(nested)]
    pub semantic: SemanticConfig,

    /// Hybrid search weighting.
    #[serde(default)]
    #[validate(nested)]
    pub rerank: RerankConfig,

    /// Per-key throttling applied to embedder calls.
    #[serde(default)]
    #[validate(nested)]
    pub embedder_rate_limit: EmbedderRateLimitConfig,

    /// Parse worker pool size; 0 means "number of available cores".
    #[serde(default)]
    pub worker_threads: usize,
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_chunk_max_tokens() -> u32 {
    crate::domain::constants::DEFAULT_MAX_CHUNK_TOKENS
}

fn default_watch_debounce_ms() -> u64 {
    crate::domain::constants::DEFAULT_DEBOUNCE_MS
}

fn default_move_window_ms() -> u64 {
    2_000
}

fn default_plugin_timeout_ms() -> u64 {
    crate::domain::constants::DEFAULT_PLUGIN_TIMEOUT_MS
}

fn default_request_deadline_ms() -> u64 {
    crate::domain::constants::DEFAULT_QUERY_TIMEOUT_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            chunk_max_tokens: default_chunk_max_tokens(),
            watch_debounce_ms: default_watch_debounce_ms(),
            move_window_ms: default_move_window_ms(),
            plugin_timeout_ms: default_plugin_timeout_ms(),
            request_deadline_ms: default_request_deadline_ms(),
            ignore_patterns: Vec::new(),
            semantic: SemanticConfig::default(),
            rerank: RerankConfig::default(),
            embedder_rate_limit: EmbedderRateLimitConfig::default(),
            worker_threads: 0,
        }
    }
}
