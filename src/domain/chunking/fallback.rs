//! Generic regex-based chunking, used when no tree-sitter grammar is
//! available for a language, or when parsing fails outright.

use super::config::LanguageConfig;
use super::ids::{compute_chunk_id, compute_file_fingerprint_id, compute_node_id};
use crate::domain::constants::{MIN_FALLBACK_CHUNK_LEN, TOKENIZER_NAME};
use crate::domain::types::{Chunk, ChunkType, FileId, Language};
use regex::Regex;

/// Regex/brace-matching chunker, precompiling its patterns once at construction.
pub struct GenericFallbackChunker<'a> {
    config: &'a LanguageConfig,
    compiled_patterns: Vec<Regex>,
}

impl<'a> GenericFallbackChunker<'a> {
    /// Build a chunker from a language's fallback patterns.
    ///
    /// Patterns that fail to compile are silently dropped rather than
    /// rejecting the whole configuration; a language with zero valid
    /// patterns degrades to whole-file chunking.
    pub fn new(config: &'a LanguageConfig) -> Self {
        let compiled_patterns = config
            .fallback_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            config,
            compiled_patterns,
        }
    }

    /// Chunk `content` by pattern-detected block starts and brace counting.
    /// A block whose token count exceeds `config.max_chunk_tokens` is split
    /// into consecutive `Mixed` chunks of at most that many tokens each,
    /// since the fallback chunker has no finer structure to recurse into.
    pub fn chunk_with_patterns(
        &self,
        content: &str,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        language: Language,
    ) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let lines: Vec<&str> = content.lines().collect();
        let mut current_block: Vec<&str> = Vec::new();
        let mut block_start = 0usize;
        let mut chunk_index = 0u32;

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            let is_block_start = self
                .compiled_patterns
                .iter()
                .any(|regex| regex.is_match(trimmed));

            if is_block_start {
                if !current_block.is_empty() {
                    self.push_chunk(
                        &current_block,
                        block_start,
                        i - 1,
                        file_id,
                        relative_path,
                        content_hash,
                        language,
                        &mut chunk_index,
                        &mut chunks,
                    );
                    current_block.clear();
                }
                current_block.push(line);
                block_start = i;
            } else if !current_block.is_empty() {
                current_block.push(line);
                if self.is_block_complete(&current_block) {
                    self.push_chunk(
                        &current_block,
                        block_start,
                        i,
                        file_id,
                        relative_path,
                        content_hash,
                        language,
                        &mut chunk_index,
                        &mut chunks,
                    );
                    current_block.clear();
                    block_start = i + 1;
                }
            }
        }

        if !current_block.is_empty() {
            self.push_chunk(
                &current_block,
                block_start,
                lines.len().saturating_sub(1),
                file_id,
                relative_path,
                content_hash,
                language,
                &mut chunk_index,
                &mut chunks,
            );
        }

        if chunks.is_empty() && !content.trim().is_empty() {
            chunks.push(self.whole_file_chunk(content, file_id, relative_path, content_hash, language));
        }

        chunks
    }

    fn is_block_complete(&self, block: &[&str]) -> bool {
        let open_count: usize = block.iter().map(|line| line.matches('{').count()).sum();
        let close_count: usize = block.iter().map(|line| line.matches('}').count()).sum();
        open_count > 0 && open_count == close_count && block.len() > 2
    }

    #[allow(clippy::too_many_arguments)]
    fn push_chunk(
        &self,
        lines: &[&str],
        start_line: usize,
        end_line: usize,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        language: Language,
        chunk_index: &mut u32,
        chunks: &mut Vec<Chunk>,
    ) {
        let content = lines.join("\n").trim().to_string();
        if content.len() < MIN_FALLBACK_CHUNK_LEN {
            return;
        }

        let whole_tokens = crate::domain::chunking::token_count(&content);
        if whole_tokens <= self.config.max_chunk_tokens {
            chunks.push(self.build_chunk(
                &content,
                start_line,
                end_line,
                file_id,
                relative_path,
                content_hash,
                language,
                ChunkType::Code,
                "fallback",
                chunk_index,
            ));
            return;
        }

        // Over budget and no finer structure to recurse into: split the
        // block into consecutive line runs of at most `max_chunk_tokens`
        // each, marked `Mixed` since they no longer align to one construct.
        let mut run_start = 0usize;
        let mut run_tokens = 0u32;
        for (offset, line) in lines.iter().enumerate() {
            let line_tokens = crate::domain::chunking::token_count(line);
            if run_tokens > 0 && run_tokens + line_tokens > self.config.max_chunk_tokens {
                let run = lines[run_start..offset].join("\n").trim().to_string();
                if run.len() >= MIN_FALLBACK_CHUNK_LEN {
                    chunks.push(self.build_chunk(
                        &run,
                        start_line + run_start,
                        start_line + offset.saturating_sub(1),
                        file_id,
                        relative_path,
                        content_hash,
                        language,
                        ChunkType::Mixed,
                        "fallback_split",
                        chunk_index,
                    ));
                }
                run_start = offset;
                run_tokens = 0;
            }
            run_tokens += line_tokens;
        }
        let run = lines[run_start..].join("\n").trim().to_string();
        if run.len() >= MIN_FALLBACK_CHUNK_LEN {
            chunks.push(self.build_chunk(
                &run,
                start_line + run_start,
                end_line,
                file_id,
                relative_path,
                content_hash,
                language,
                ChunkType::Mixed,
                "fallback_split",
                chunk_index,
            ));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_chunk(
        &self,
        content: &str,
        start_line: usize,
        end_line: usize,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        language: Language,
        chunk_type: ChunkType,
        node_type: &str,
        chunk_index: &mut u32,
    ) -> Chunk {
        let fingerprint = compute_file_fingerprint_id(relative_path, content_hash);
        let node_id = compute_node_id(&format!("{relative_path}#fallback#{start_line}"), node_type);
        let token_count = crate::domain::chunking::token_count(content);

        Chunk {
            chunk_id: compute_chunk_id(content),
            node_id,
            file_fingerprint_id: fingerprint,
            symbol_hash: None,
            definition_id: None,
            content: content.to_string(),
            file_id,
            line_start: start_line as u32 + 1,
            line_end: end_line as u32 + 1,
            byte_start: 0,
            byte_end: 0,
            chunk_type,
            language,
            node_type: node_type.to_string(),
            parent_chunk_id: None,
            depth: 0,
            chunk_index: {
                let idx = *chunk_index;
                *chunk_index += 1;
                idx
            },
            token_count,
            tokenizer: TOKENIZER_NAME.to_string(),
        }
    }

    fn whole_file_chunk(
        &self,
        content: &str,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        language: Language,
    ) -> Chunk {
        let trimmed = content.trim().to_string();
        let fingerprint = compute_file_fingerprint_id(relative_path, content_hash);
        let line_end = content.lines().count().max(1) as u32;
        Chunk {
            chunk_id: compute_chunk_id(&trimmed),
            node_id: compute_node_id(&format!("{relative_path}#whole_file"), "file"),
            file_fingerprint_id: fingerprint,
            symbol_hash: None,
            definition_id: None,
            content: trimmed.clone(),
            file_id,
            line_start: 1,
            line_end,
            byte_start: 0,
            byte_end: trimmed.len() as u32,
            chunk_type: ChunkType::Code,
            language,
            node_type: "raw".to_string(),
            parent_chunk_id: None,
            depth: 0,
            chunk_index: 0,
            token_count: crate::domain::chunking::token_count(&trimmed),
            tokenizer: TOKENIZER_NAME.to_string(),
        }
    }
}
