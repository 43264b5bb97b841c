//! Full-repository indexing: walks a repository tree, skips unchanged
//! files, and commits dispatcher output to storage (spec §2 data flow,
//! §4.5).

use crate::application::dispatcher::Dispatcher;
use crate::domain::error::Result;
use crate::domain::ports::{EmbeddingProvider, RateLimiterBackend, StorageEngine};
use crate::domain::types::{FileRecord, IndexShard, Language, RepositoryId};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, instrument, warn};

/// Aggregate result of one full-repository index pass.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct IndexingSummary {
    pub files_scanned: u64,
    pub files_indexed: u64,
    pub files_skipped_unchanged: u64,
    pub files_oversized: u64,
}

/// Drives `Dispatcher` over a repository tree.
pub struct IndexingService {
    dispatcher: Arc<Dispatcher>,
    max_file_size: u64,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    rate_limiter: Option<Arc<dyn RateLimiterBackend>>,
}

impl IndexingService {
    pub fn new(dispatcher: Arc<Dispatcher>, max_file_size: u64) -> Self {
        Self {
            dispatcher,
            max_file_size,
            embedder: None,
            rate_limiter: None,
        }
    }

    /// Attach the embedding provider used to populate the vector index after
    /// each commit. Without one, chunks are indexed lexically only.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Throttle embedder calls through `limiter`, keyed by the embedder's
    /// model name.
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiterBackend>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Index every non-ignored file under `root_path`, skipping files whose
    /// content hash matches the stored record.
    #[instrument(skip(self, storage))]
    pub async fn index_repository(
        &self,
        storage: Arc<dyn StorageEngine>,
        root_path: &Path,
    ) -> Result<IndexingSummary> {
        let mut summary = IndexingSummary::default();
        let walker = ignore::WalkBuilder::new(root_path).hidden(false).build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "walk error, skipping entry");
                    continue;
                }
            };
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            summary.files_scanned += 1;

            let relative_path = match entry.path().strip_prefix(root_path) {
                Ok(p) => p.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };

            match self.index_one(&storage, entry.path(), &relative_path).await {
                Ok(Outcome::Indexed) => summary.files_indexed += 1,
                Ok(Outcome::Unchanged) => summary.files_skipped_unchanged += 1,
                Ok(Outcome::Oversized) => {
                    summary.files_oversized += 1;
                    summary.files_indexed += 1;
                }
                Err(err) => warn!(relative_path, error = %err, "failed to index file"),
            }
        }

        info!(?summary, "repository index pass complete");
        Ok(summary)
    }

    /// Re-index a single file by repository-relative path (the Handler's
    /// `reindex_file` operation).
    pub async fn reindex_file(
        &self,
        storage: Arc<dyn StorageEngine>,
        root_path: &Path,
        relative_path: &str,
    ) -> Result<()> {
        let absolute = root_path.join(relative_path);
        self.index_one(&storage, &absolute, relative_path).await?;
        Ok(())
    }

    async fn index_one(
        &self,
        storage: &Arc<dyn StorageEngine>,
        absolute_path: &Path,
        relative_path: &str,
    ) -> Result<Outcome> {
        let bytes = tokio::fs::read(absolute_path).await?;
        let size = bytes.len() as u64;
        let content_hash = hash_bytes(&bytes);

        if let Some(existing) = storage.get_file_by_path(relative_path).await? {
            if existing.content_hash == content_hash && !existing.is_deleted {
                return Ok(Outcome::Unchanged);
            }
        }

        let language = resolve_language(relative_path, &bytes);

        let now = now_unix();
        let file_id = storage.ensure_file_id(relative_path).await?;

        let file = FileRecord {
            id: file_id,
            repository_id: storage.repository().id,
            relative_path: relative_path.to_string(),
            content_hash: content_hash.clone(),
            language,
            size,
            last_seen_at: now,
            is_deleted: false,
        };

        if size > self.max_file_size {
            let content = String::from_utf8_lossy(&bytes);
            let shard = self
                .dispatcher
                .raw_fallback_shard(file_id, relative_path, &content_hash, &content, language);
            storage.commit_shard(&file, &shard).await?;
            self.embed_shard(storage, &shard).await;
            return Ok(Outcome::Oversized);
        }

        let content = String::from_utf8_lossy(&bytes);
        let shard = self
            .dispatcher
            .index_file(file_id, relative_path, &content_hash, &content, language)
            .await;
        storage.commit_shard(&file, &shard).await?;
        self.embed_shard(storage, &shard).await;
        Ok(Outcome::Indexed)
    }

    /// Embed each chunk of a freshly committed shard and persist the vectors.
    /// Best-effort: an embedder error on one chunk is logged and skipped
    /// rather than failing the whole indexing pass (spec §4.6 degrade rule).
    async fn embed_shard(&self, storage: &Arc<dyn StorageEngine>, shard: &IndexShard) {
        let Some(embedder) = &self.embedder else {
            return;
        };
        for chunk in &shard.chunks {
            if let Some(limiter) = &self.rate_limiter {
                if !limiter.check(embedder.model_name()).await.allowed {
                    warn!(chunk_id = %chunk.chunk_id, "embedder rate limit exceeded, skipping chunk");
                    continue;
                }
            }
            let vector = match embedder.embed(&chunk.content).await {
                Ok(v) => v,
                Err(err) => {
                    warn!(chunk_id = %chunk.chunk_id, error = %err, "embedding failed, skipping chunk");
                    continue;
                }
            };
            if let Err(err) = storage
                .upsert_embedding(
                    chunk.file_id,
                    &chunk.chunk_id,
                    embedder.model_name(),
                    embedder.dimensions() as u32,
                    &vector,
                )
                .await
            {
                warn!(chunk_id = %chunk.chunk_id, error = %err, "failed to persist embedding");
            }
        }
    }
}

enum Outcome {
    Indexed,
    Unchanged,
    Oversized,
}

/// Resolve a file's language by extension mapping, then filename rules for
/// extensionless build manifests, then a shebang content sniff (spec §4.1
/// plugin selection order).
fn resolve_language(relative_path: &str, bytes: &[u8]) -> Language {
    let extension_language = Path::new(relative_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(Language::from_extension)
        .unwrap_or(Language::Unknown);
    if extension_language != Language::Unknown {
        return extension_language;
    }

    let file_name = Path::new(relative_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    if let Some(language) = language_from_filename(file_name) {
        return language;
    }

    language_from_shebang(bytes).unwrap_or(Language::Unknown)
}

/// Recognize build-manifest filenames with no extension to key off of.
fn language_from_filename(file_name: &str) -> Option<Language> {
    match file_name {
        "Dockerfile" | "Containerfile" => Some(Language::Shell),
        "Makefile" | "makefile" | "GNUmakefile" => Some(Language::Shell),
        "Rakefile" | "Gemfile" | "Vagrantfile" => Some(Language::Ruby),
        _ => None,
    }
}

/// Sniff an extensionless file's interpreter from its `#!` line.
fn language_from_shebang(bytes: &[u8]) -> Option<Language> {
    let first_line = bytes
        .split(|&b| b == b'\n')
        .next()
        .and_then(|line| std::str::from_utf8(line).ok())?
        .trim();
    let interpreter_line = first_line.strip_prefix("#!")?;
    let interpreter = interpreter_line.split_whitespace().last()?;
    let interpreter_name = interpreter.rsplit('/').next().unwrap_or(interpreter);

    match interpreter_name {
        "sh" | "bash" | "dash" | "zsh" | "ksh" => Some(Language::Shell),
        "python" | "python2" | "python3" => Some(Language::Python),
        "node" | "nodejs" => Some(Language::JavaScript),
        "ruby" => Some(Language::Ruby),
        "php" => Some(Language::Php),
        _ => None,
    }
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mapping_wins_over_filename_rules() {
        assert_eq!(resolve_language("src/main.rs", b"fn main() {}"), Language::Rust);
    }

    #[test]
    fn dockerfile_resolves_by_filename_with_no_extension() {
        assert_eq!(resolve_language("Dockerfile", b"FROM scratch\n"), Language::Shell);
    }

    #[test]
    fn gemfile_resolves_to_ruby_by_filename() {
        assert_eq!(resolve_language("Gemfile", b"source 'https://rubygems.org'\n"), Language::Ruby);
    }

    #[test]
    fn extensionless_script_resolves_by_shebang() {
        let script = b"#!/usr/bin/env python3\nprint('hi')\n";
        assert_eq!(resolve_language("tools/build", script), Language::Python);
    }

    #[test]
    fn bash_shebang_resolves_to_shell() {
        assert_eq!(resolve_language("run", b"#!/bin/bash\necho hi\n"), Language::Shell);
    }

    #[test]
    fn no_extension_no_filename_rule_no_shebang_is_unknown() {
        assert_eq!(resolve_language("NOTES", b"just some text\n"), Language::Unknown);
    }
}

/// Derive a repository id from its canonical root path (spec §3).
pub fn repository_id_for(root_path: &Path) -> Result<RepositoryId> {
    let canonical = std::fs::canonicalize(root_path)?;
    Ok(RepositoryId::from_path(&canonical))
}
