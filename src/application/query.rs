//! Query Engine: symbol lookup, lexical/semantic search, hybrid rerank
//! (spec §4.6).

use crate::domain::error::Error;
use crate::domain::ports::{
    EmbeddingProvider, RateLimiterBackend, SearchFilters, StorageEngine, SymbolLookupResult,
};
use crate::domain::types::SymbolKind;
use std::sync::Arc;
use tracing::{instrument, warn};

/// One hybrid search result with both contributing sub-scores, for
/// explainability (spec §4.6).
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchHit {
    pub chunk_id: String,
    pub relative_path: String,
    pub line_start: u32,
    pub line_end: u32,
    pub snippet: String,
    pub lexical_score: Option<f32>,
    pub semantic_score: Option<f32>,
    pub combined_score: f32,
}

/// Outcome of a search request, including whether it degraded to lexical-only.
pub struct SearchOutcome {
    pub hits: Vec<SearchHit>,
    pub total: usize,
    pub degraded: bool,
    pub warning: Option<String>,
}

/// Answers spec §4.6's three query families against one repository's storage.
pub struct QueryEngine {
    storage: Arc<dyn StorageEngine>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    rate_limiter: Option<Arc<dyn RateLimiterBackend>>,
    alpha: f32,
    snippet_tokens: usize,
}

impl QueryEngine {
    pub fn new(storage: Arc<dyn StorageEngine>, embedder: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        Self {
            storage,
            embedder,
            rate_limiter: None,
            alpha: crate::domain::constants::DEFAULT_HYBRID_ALPHA,
            snippet_tokens: 64,
        }
    }

    /// Override the hybrid weighting (config key `rerank.alpha`).
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Throttle embedder calls through `limiter`, keyed by the embedder's
    /// model name (spec §5 "Embedder clients... per-key rate limiting").
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiterBackend>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Exact-then-prefix symbol lookup (spec §4.6).
    #[instrument(skip(self))]
    pub async fn lookup_symbol(
        &self,
        name: &str,
        kind: Option<SymbolKind>,
        limit: usize,
    ) -> crate::domain::error::Result<Vec<SymbolLookupResult>> {
        if name.trim().is_empty() {
            return Err(Error::invalid_argument("symbol name must not be empty"));
        }
        self.storage.lookup_symbol(name, kind, limit).await
    }

    /// Resolve a symbol hash to its declaration location.
    pub async fn get_definition(&self, symbol_hash: &str) -> crate::domain::error::Result<Option<SymbolLookupResult>> {
        self.storage.get_definition(symbol_hash).await
    }

    /// All known reference sites for a symbol hash.
    pub async fn find_references(&self, symbol_hash: &str) -> crate::domain::error::Result<Vec<SymbolLookupResult>> {
        self.storage.find_references(symbol_hash).await
    }

    /// Lexical, semantic, or hybrid search depending on `semantic` and
    /// whether an embedder is configured (spec §4.6, S3).
    #[instrument(skip(self, query))]
    pub async fn search_code(
        &self,
        query: &str,
        semantic: bool,
        filters: &SearchFilters,
        limit: usize,
        offset: usize,
    ) -> crate::domain::error::Result<SearchOutcome> {
        if query.trim().is_empty() {
            return Err(Error::invalid_argument("search query must not be empty"));
        }

        let lexical_fut = self.storage.fulltext_search(query, filters, limit + offset, 0);

        if !semantic || self.embedder.is_none() {
            let (lexical_hits, lexical_total) = lexical_fut.await?;
            let page = paginate(lexical_hits, limit, offset);
            let hits = page
                .into_iter()
                .map(|h| SearchHit {
                    chunk_id: h.chunk_id,
                    relative_path: h.relative_path,
                    line_start: h.line_start,
                    line_end: h.line_end,
                    snippet: truncate_snippet(&h.snippet, self.snippet_tokens),
                    lexical_score: Some(h.score),
                    semantic_score: None,
                    combined_score: h.score,
                })
                .collect();
            return Ok(SearchOutcome {
                hits,
                total: lexical_total,
                degraded: false,
                warning: None,
            });
        }

        let embedder = self.embedder.as_ref().expect("checked above");
        let rate_limited = !self.rate_limit_permits(embedder.model_name()).await;

        let semantic_fut = async {
            if rate_limited {
                warn!(model = embedder.model_name(), "embedder rate limit exceeded, falling back to lexical-only");
                return (Vec::new(), Some("semantic search rate limited".to_string()));
            }

            let semantic_result = async {
                let vector = embedder.embed(query).await?;
                self.storage.vector_search(&vector, filters, limit + offset).await
            }
            .await;

            match semantic_result {
                Ok(hits) => (hits, None),
                Err(err) => {
                    warn!(error = %err, "embedder failed, falling back to lexical-only");
                    (Vec::new(), Some(format!("semantic search unavailable: {err}")))
                }
            }
        };

        let (lexical_result, (semantic_hits, warning)) = tokio::join!(lexical_fut, semantic_fut);
        let (lexical_hits, lexical_total) = lexical_result?;

        let degraded = warning.is_some();
        let chunk_ids: Vec<String> = semantic_hits.iter().map(|h| h.chunk_id.clone()).collect();
        let semantic_chunks = if chunk_ids.is_empty() {
            Vec::new()
        } else {
            self.storage.hydrate_chunks(&chunk_ids).await?
        };

        let hits = hybrid_rerank(lexical_hits, semantic_hits, semantic_chunks, self.alpha, self.snippet_tokens);
        let page = paginate(hits, limit, offset);

        Ok(SearchOutcome {
            total: lexical_total,
            hits: page,
            degraded,
            warning,
        })
    }

    async fn rate_limit_permits(&self, key: &str) -> bool {
        match &self.rate_limiter {
            Some(limiter) => limiter.check(key).await.allowed,
            None => true,
        }
    }
}

fn truncate_snippet(snippet: &str, max_tokens: usize) -> String {
    let tokens: Vec<&str> = snippet.split_whitespace().collect();
    if tokens.len() <= max_tokens {
        snippet.to_string()
    } else {
        tokens[..max_tokens].join(" ")
    }
}

fn paginate<T>(items: Vec<T>, limit: usize, offset: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(limit).collect()
}

fn normalize(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().cloned().fold(f32::MIN, f32::max);
    let min = scores.iter().cloned().fold(f32::MAX, f32::min);
    if !max.is_finite() || !min.is_finite() || (max - min).abs() < f32::EPSILON {
        return scores.iter().map(|_| 1.0).collect();
    }
    scores.iter().map(|s| (s - min) / (max - min)).collect()
}

fn hybrid_rerank(
    lexical: Vec<crate::domain::ports::FulltextHit>,
    semantic: Vec<crate::domain::ports::VectorHit>,
    semantic_chunks: Vec<crate::domain::types::Chunk>,
    alpha: f32,
    snippet_tokens: usize,
) -> Vec<SearchHit> {
    use std::collections::HashMap;

    let lex_scores: Vec<f32> = lexical.iter().map(|h| h.score).collect();
    let lex_norm = normalize(&lex_scores);
    let sem_scores: Vec<f32> = semantic.iter().map(|h| h.score).collect();
    let sem_norm = normalize(&sem_scores);

    let chunk_by_id: HashMap<&str, &crate::domain::types::Chunk> =
        semantic_chunks.iter().map(|c| (c.chunk_id.as_str(), c)).collect();

    let mut merged: HashMap<String, SearchHit> = HashMap::new();

    for (hit, score) in lexical.into_iter().zip(lex_norm) {
        merged.insert(
            hit.chunk_id.clone(),
            SearchHit {
                chunk_id: hit.chunk_id,
                relative_path: hit.relative_path,
                line_start: hit.line_start,
                line_end: hit.line_end,
                snippet: truncate_snippet(&hit.snippet, snippet_tokens),
                lexical_score: Some(score),
                semantic_score: None,
                combined_score: alpha * score,
            },
        );
    }

    for (hit, score) in semantic.into_iter().zip(sem_norm) {
        merged
            .entry(hit.chunk_id.clone())
            .and_modify(|existing| {
                existing.semantic_score = Some(score);
                existing.combined_score += (1.0 - alpha) * score;
            })
            .or_insert_with(|| {
                let chunk = chunk_by_id.get(hit.chunk_id.as_str());
                SearchHit {
                    chunk_id: hit.chunk_id.clone(),
                    relative_path: String::new(),
                    line_start: chunk.map(|c| c.line_start).unwrap_or(0),
                    line_end: chunk.map(|c| c.line_end).unwrap_or(0),
                    snippet: chunk
                        .map(|c| truncate_snippet(&c.content, snippet_tokens))
                        .unwrap_or_default(),
                    lexical_score: None,
                    semantic_score: Some(score),
                    combined_score: (1.0 - alpha) * score,
                }
            });
    }

    let mut hits: Vec<SearchHit> = merged.into_values().collect();
    hits.sort_by(|a, b| b.combined_score.partial_cmp(&a.combined_score).unwrap_or(std::cmp::Ordering::Equal));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_handles_constant_scores() {
        let normalized = normalize(&[3.0, 3.0, 3.0]);
        assert!(normalized.iter().all(|&s| (s - 1.0).abs() < f32::EPSILON));
    }

    #[test]
    fn normalize_maps_range_to_unit_interval() {
        let normalized = normalize(&[0.0, 5.0, 10.0]);
        assert!((normalized[0] - 0.0).abs() < f32::EPSILON);
        assert!((normalized[2] - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn truncate_snippet_respects_token_budget() {
        let snippet = "one two three four five";
        assert_eq!(truncate_snippet(snippet, 3), "one two three");
    }

    #[test]
    fn paginate_splits_into_consistent_consecutive_pages() {
        let items: Vec<u32> = (0..20).collect();
        let page_a = paginate(items.clone(), 10, 0);
        let page_b = paginate(items.clone(), 10, 10);
        let whole = paginate(items, 20, 0);
        assert_eq!([page_a, page_b].concat(), whole);
    }

    #[test]
    fn paginate_past_the_end_returns_empty() {
        let items = vec![1, 2, 3];
        assert!(paginate(items, 10, 50).is_empty());
    }
}
