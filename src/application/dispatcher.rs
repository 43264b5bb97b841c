//! Dispatcher: per-file plugin orchestration (spec §4.5).

use crate::domain::chunking::ids::compute_file_fingerprint_id;
use crate::domain::chunking::{GenericFallbackChunker, LanguageConfig};
use crate::domain::constants::{DEFAULT_CIRCUIT_BREAKER_FAILURE_THRESHOLD, DEFAULT_PLUGIN_TIMEOUT_MS};
use crate::domain::error::{Error, Result};
use crate::domain::ports::{CircuitBreakerBackend, LanguagePlugin, PluginRegistry};
use crate::domain::types::{Chunk, ChunkType, FileId, IndexShard, Language, Quality};
use crate::infrastructure::workers::WorkerPool;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

/// In-memory, single-process circuit breaker: counts consecutive failures
/// and opens after `threshold`, resetting to half-open after `reset_after`.
pub struct InMemoryCircuitBreaker {
    name: String,
    threshold: u32,
    reset_after: Duration,
    failures: std::sync::atomic::AtomicU32,
    opened_at: std::sync::Mutex<Option<std::time::Instant>>,
}

impl InMemoryCircuitBreaker {
    pub fn new(name: impl Into<String>, threshold: u32, reset_after: Duration) -> Self {
        Self {
            name: name.into(),
            threshold,
            reset_after,
            failures: std::sync::atomic::AtomicU32::new(0),
            opened_at: std::sync::Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl CircuitBreakerBackend for InMemoryCircuitBreaker {
    async fn is_call_permitted(&self) -> bool {
        let mut opened_at = self.opened_at.lock().expect("circuit breaker mutex poisoned");
        match *opened_at {
            Some(at) if at.elapsed() < self.reset_after => false,
            Some(_) => {
                // Cooldown elapsed: allow one probing call (half-open).
                *opened_at = None;
                true
            }
            None => true,
        }
    }

    async fn record_success(&self) {
        self.failures.store(0, std::sync::atomic::Ordering::SeqCst);
        *self.opened_at.lock().expect("circuit breaker mutex poisoned") = None;
    }

    async fn record_failure(&self) {
        let failures = self.failures.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        if failures >= self.threshold {
            *self.opened_at.lock().expect("circuit breaker mutex poisoned") = Some(std::time::Instant::now());
        }
    }

    async fn state(&self) -> crate::domain::ports::CircuitBreakerState {
        let opened_at = self.opened_at.lock().expect("circuit breaker mutex poisoned");
        match *opened_at {
            Some(at) if at.elapsed() < self.reset_after => crate::domain::ports::CircuitBreakerState::Open,
            Some(_) => crate::domain::ports::CircuitBreakerState::HalfOpen,
            None => crate::domain::ports::CircuitBreakerState::Closed,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Orchestrates plugin invocation, timeout discipline, and shard merging
/// for a single file at a time. One `Dispatcher` is shared across all
/// repositories; circuit breakers are keyed per plugin id.
pub struct Dispatcher {
    registry: Arc<dyn PluginRegistry>,
    breakers: DashMap<&'static str, Arc<dyn CircuitBreakerBackend>>,
    plugin_timeout: Duration,
    workers: Arc<WorkerPool>,
    max_chunk_tokens: u32,
}

impl Dispatcher {
    /// Build a dispatcher over `registry`, using the default plugin timeout
    /// and a worker pool sized by rayon's default (available parallelism).
    pub fn new(registry: Arc<dyn PluginRegistry>) -> Self {
        Self::with_timeout(registry, Duration::from_millis(DEFAULT_PLUGIN_TIMEOUT_MS))
    }

    /// Build a dispatcher with an explicit per-plugin timeout budget.
    pub fn with_timeout(registry: Arc<dyn PluginRegistry>, plugin_timeout: Duration) -> Self {
        Self {
            registry,
            breakers: DashMap::new(),
            plugin_timeout,
            workers: Arc::new(WorkerPool::new(0)),
            max_chunk_tokens: crate::domain::constants::DEFAULT_MAX_CHUNK_TOKENS,
        }
    }

    /// Run plugin extraction on `workers` instead of the default pool
    /// (config key `worker_threads`).
    pub fn with_workers(mut self, workers: Arc<WorkerPool>) -> Self {
        self.workers = workers;
        self
    }

    /// Override the token budget used to chunk files with no claiming
    /// plugin (config key `chunk_max_tokens`).
    pub fn with_max_chunk_tokens(mut self, max_chunk_tokens: u32) -> Self {
        self.max_chunk_tokens = max_chunk_tokens;
        self
    }

    fn breaker_for(&self, plugin_id: &'static str) -> Arc<dyn CircuitBreakerBackend> {
        self.breakers
            .entry(plugin_id)
            .or_insert_with(|| {
                Arc::new(InMemoryCircuitBreaker::new(
                    plugin_id,
                    DEFAULT_CIRCUIT_BREAKER_FAILURE_THRESHOLD,
                    Duration::from_millis(crate::domain::constants::DEFAULT_CIRCUIT_BREAKER_RESET_MS),
                ))
            })
            .clone()
    }

    /// Index one file: select plugins, run them under timeout, merge their
    /// shards, and return the result. Never fails — a file with no claiming
    /// plugin, or whose sole plugin times out, still yields a shard with
    /// degraded `quality` (spec §4.1 failure mode, §4.5 timeout discipline).
    #[instrument(skip(self, content), fields(relative_path, language = %language))]
    pub async fn index_file(
        &self,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        content: &str,
        language: Language,
    ) -> IndexShard {
        let plugins = self.registry.plugins_for(language);
        if plugins.is_empty() {
            return self.raw_fallback_shard(file_id, relative_path, content_hash, content, language);
        }

        let mut shards = Vec::with_capacity(plugins.len());
        for plugin in plugins {
            match self.run_plugin(plugin.clone(), file_id, relative_path, content_hash, content, language).await {
                Some(shard) => shards.push(shard),
                None => continue,
            }
        }

        if shards.is_empty() {
            return self.raw_fallback_shard(file_id, relative_path, content_hash, content, language);
        }

        merge_shards(shards)
    }

    async fn run_plugin(
        &self,
        plugin: Arc<dyn LanguagePlugin>,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        content: &str,
        language: Language,
    ) -> Option<IndexShard> {
        let plugin_id = plugin.plugin_id();
        let breaker = self.breaker_for(plugin_id);
        if !breaker.is_call_permitted().await {
            warn!(plugin_id, "circuit breaker open, skipping plugin");
            return None;
        }

        let relative_path = relative_path.to_string();
        let content_hash = content_hash.to_string();
        let content = content.to_string();
        let plugin_for_worker = plugin.clone();

        let result = tokio::time::timeout(
            self.plugin_timeout,
            self.workers
                .run(move || plugin_for_worker.extract(file_id, &relative_path, &content_hash, &content, language)),
        )
        .await;

        match result {
            Ok(Ok(shard)) => {
                breaker.record_success().await;
                Some(shard)
            }
            Ok(Err(panicked)) => {
                warn!(plugin_id, error = %panicked, "plugin task panicked");
                breaker.record_failure().await;
                None
            }
            Err(_elapsed) => {
                warn!(plugin_id, timeout_ms = self.plugin_timeout.as_millis() as u64, "plugin timed out");
                breaker.record_failure().await;
                None
            }
        }
    }

    /// Build a fallback-quality shard without invoking any plugin (used for
    /// files with no claiming plugin, or files over the size threshold).
    pub fn raw_fallback_shard(
        &self,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        content: &str,
        language: Language,
    ) -> IndexShard {
        let config = LanguageConfig {
            extraction_rules: Vec::new(),
            fallback_patterns: Vec::new(),
            max_chunk_tokens: self.max_chunk_tokens,
        };
        let chunker = GenericFallbackChunker::new(&config);
        let mut chunks = chunker.chunk_with_patterns(content, file_id, relative_path, content_hash, language);
        if chunks.is_empty() {
            let fingerprint = compute_file_fingerprint_id(relative_path, content_hash);
            chunks.push(Chunk {
                chunk_id: crate::domain::chunking::ids::compute_chunk_id(content),
                node_id: crate::domain::chunking::ids::compute_node_id(relative_path, "raw"),
                file_fingerprint_id: fingerprint,
                symbol_hash: None,
                definition_id: None,
                content: content.to_string(),
                file_id,
                line_start: 1,
                line_end: content.lines().count().max(1) as u32,
                byte_start: 0,
                byte_end: content.len() as u32,
                chunk_type: ChunkType::Data,
                language,
                node_type: "raw".to_string(),
                parent_chunk_id: None,
                depth: 0,
                chunk_index: 0,
                token_count: crate::domain::chunking::token_count(content),
                tokenizer: crate::domain::constants::TOKENIZER_NAME.to_string(),
            });
        }

        IndexShard {
            file_id,
            symbols: Vec::new(),
            chunks,
            imports: Vec::new(),
            quality: Quality::Fallback,
        }
    }
}

/// Merge shards from multiple plugins claiming the same file, deduplicating
/// overlapping chunks by preferring higher `quality` then larger span
/// (spec §4.1).
pub fn merge_shards(mut shards: Vec<IndexShard>) -> IndexShard {
    shards.sort_by_key(|s| std::cmp::Reverse(quality_rank(s.quality)));

    let mut merged = IndexShard {
        file_id: shards[0].file_id,
        symbols: Vec::new(),
        chunks: Vec::new(),
        imports: Vec::new(),
        quality: shards[0].quality,
    };

    let mut claimed_ranges: Vec<(u32, u32)> = Vec::new();
    for shard in shards {
        for chunk in shard.chunks {
            let overlaps = claimed_ranges
                .iter()
                .any(|(start, end)| chunk.line_start <= *end && chunk.line_end >= *start);
            if overlaps {
                continue;
            }
            claimed_ranges.push((chunk.line_start, chunk.line_end));
            merged.chunks.push(chunk);
        }
        merged.symbols.extend(shard.symbols);
        merged.imports.extend(shard.imports);
    }

    merged.chunks.sort_by_key(|c| (c.line_start, c.chunk_index));
    for (idx, chunk) in merged.chunks.iter_mut().enumerate() {
        chunk.chunk_index = idx as u32;
    }

    merged
}

fn quality_rank(quality: Quality) -> u8 {
    match quality {
        Quality::Full => 2,
        Quality::Partial => 1,
        Quality::Fallback => 0,
    }
}

/// Bridges a rusqlite/r2d2 constraint-violation style error into a domain
/// error with the operation name attached, used by callers that need to
/// distinguish a dispatcher-stage failure from a storage-stage one.
pub fn dispatch_timeout_error(operation: &str, budget_ms: u64) -> Error {
    Error::timeout(operation, budget_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SymbolKind;

    fn shard(quality: Quality, lines: (u32, u32), node_type: &str) -> IndexShard {
        IndexShard {
            file_id: FileId(1),
            symbols: Vec::new(),
            chunks: vec![Chunk {
                chunk_id: format!("chunk-{}-{}", lines.0, lines.1),
                node_id: "node".to_string(),
                file_fingerprint_id: "fp".to_string(),
                symbol_hash: None,
                definition_id: None,
                content: "x".repeat(30),
                file_id: FileId(1),
                line_start: lines.0,
                line_end: lines.1,
                byte_start: 0,
                byte_end: 30,
                chunk_type: ChunkType::Code,
                language: Language::Rust,
                node_type: node_type.to_string(),
                parent_chunk_id: None,
                depth: 0,
                chunk_index: 0,
                token_count: 5,
                tokenizer: "cl100k_base".to_string(),
            }],
            imports: Vec::new(),
            quality,
        }
    }

    #[test]
    fn merge_prefers_higher_quality_on_overlap() {
        let full = shard(Quality::Full, (1, 10), "function_item");
        let fallback = shard(Quality::Fallback, (1, 10), "fallback");
        let merged = merge_shards(vec![fallback, full]);
        assert_eq!(merged.chunks.len(), 1);
        assert_eq!(merged.chunks[0].node_type, "function_item");
    }

    #[test]
    fn merge_keeps_disjoint_chunks_from_both_shards() {
        let a = shard(Quality::Full, (1, 5), "function_item");
        let b = shard(Quality::Full, (6, 10), "doc_comment");
        let merged = merge_shards(vec![a, b]);
        assert_eq!(merged.chunks.len(), 2);
    }

    #[test]
    fn quality_rank_orders_full_over_fallback() {
        assert!(quality_rank(Quality::Full) > quality_rank(Quality::Fallback));
    }

    #[test]
    fn symbol_kind_priority_is_deterministic() {
        assert!(SymbolKind::Class.priority() < SymbolKind::Import.priority());
    }

    /// A plugin that blows straight through any reasonable timeout.
    struct SlowPlugin;

    impl LanguagePlugin for SlowPlugin {
        fn plugin_id(&self) -> &'static str {
            "slow-test-plugin"
        }

        fn supported_languages(&self) -> &'static [Language] {
            &[Language::Rust]
        }

        fn extract(
            &self,
            _file_id: FileId,
            _relative_path: &str,
            _content_hash: &str,
            _content: &str,
            _language: Language,
        ) -> IndexShard {
            std::thread::sleep(Duration::from_secs(60));
            unreachable!("the dispatcher should have timed out before this returns")
        }
    }

    struct SinglePluginRegistry(Arc<dyn LanguagePlugin>);

    impl PluginRegistry for SinglePluginRegistry {
        fn plugins_for(&self, _language: Language) -> Vec<Arc<dyn LanguagePlugin>> {
            vec![self.0.clone()]
        }
    }

    /// S5: a plugin that exceeds its timeout budget degrades to a single
    /// `Quality::Fallback` shard rather than hanging the batch.
    #[tokio::test]
    async fn a_plugin_that_exceeds_its_timeout_degrades_to_a_fallback_shard() {
        let registry: Arc<dyn PluginRegistry> = Arc::new(SinglePluginRegistry(Arc::new(SlowPlugin)));
        let dispatcher = Dispatcher::with_timeout(registry, Duration::from_millis(20));

        let result = dispatcher
            .index_file(FileId(1), "src/slow.rs", "hash", "fn slow() {}", Language::Rust)
            .await;

        assert_eq!(result.quality, Quality::Fallback);
        assert_eq!(result.chunks.len(), 1);
    }
}
