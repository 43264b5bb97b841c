//! Document-structural plugin for Markdown (spec §4.1 plugin polymorphism,
//! S4 overlapping plugins). Splits a file into prose segments (`doc`
//! chunks) and fenced code blocks, delegating each recognized fenced
//! language back to the registry so e.g. a fenced Python block produces
//! its own `code`/`python` chunks alongside the surrounding `doc` chunks,
//! with disjoint line ranges.

use crate::domain::chunking::ids::{compute_chunk_id, compute_file_fingerprint_id, compute_node_id};
use crate::domain::chunking::token_count;
use crate::domain::constants::{MIN_FALLBACK_CHUNK_LEN, TOKENIZER_NAME};
use crate::domain::ports::{LanguagePlugin, PluginRegistry};
use crate::domain::types::{Chunk, ChunkType, FileId, IndexShard, Language, Quality, Symbol, SymbolKind};
use std::sync::Arc;

/// Claims `.md`/`.markdown` files. Needs a handle back to the registry to
/// delegate fenced code blocks to the plugin registered for that language.
pub struct MarkdownPlugin {
    registry: Arc<dyn PluginRegistry>,
}

impl MarkdownPlugin {
    pub fn new(registry: Arc<dyn PluginRegistry>) -> Self {
        Self { registry }
    }
}

impl LanguagePlugin for MarkdownPlugin {
    fn plugin_id(&self) -> &'static str {
        "markdown"
    }

    fn supported_languages(&self) -> &'static [Language] {
        &[Language::Markdown]
    }

    fn extract(
        &self,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        content: &str,
        _language: Language,
    ) -> IndexShard {
        let fingerprint = compute_file_fingerprint_id(relative_path, content_hash);
        let mut chunks = Vec::new();
        let mut symbols = Vec::new();
        let mut chunk_index = 0u32;

        let lines: Vec<&str> = content.lines().collect();
        let mut prose_start = 0usize;
        let mut i = 0usize;
        let mut had_error = false;

        while i < lines.len() {
            let trimmed = lines[i].trim_start();
            if let Some(level) = heading_level(trimmed) {
                symbols.push(Symbol {
                    file_id,
                    name: trimmed.trim_start_matches('#').trim().to_string(),
                    kind: SymbolKind::Module,
                    line_start: i as u32 + 1,
                    line_end: i as u32 + 1,
                    column_start: 0,
                    signature: None,
                    parent_symbol: None,
                    visibility: None,
                    modifiers: Vec::new(),
                    docstring: None,
                    token_count: None,
                    symbol_hash: Symbol::compute_symbol_hash(
                        &format!("{relative_path}#{}", trimmed.trim_start_matches('#').trim()),
                        SymbolKind::Module,
                    ),
                });
                let _ = level;
                i += 1;
                continue;
            }

            if let Some(lang_tag) = trimmed.strip_prefix("```") {
                flush_prose(
                    &lines,
                    prose_start,
                    i,
                    relative_path,
                    &fingerprint,
                    file_id,
                    &mut chunk_index,
                    &mut chunks,
                );

                let fence_body_start = i + 1;
                let mut j = fence_body_start;
                while j < lines.len() && lines[j].trim_start() != "```" {
                    j += 1;
                }
                let body_end = j.min(lines.len());

                if fence_body_start < body_end {
                    let body = lines[fence_body_start..body_end].join("\n");
                    let lang = Language::from_name(lang_tag.trim());
                    match self.delegate_fence(file_id, relative_path, content_hash, &body, lang, fence_body_start) {
                        Some(mut fence_shard) => {
                            had_error = had_error || fence_shard.quality != Quality::Full;
                            symbols.append(&mut fence_shard.symbols);
                            for mut c in fence_shard.chunks {
                                c.chunk_index = chunk_index;
                                chunk_index += 1;
                                chunks.push(c);
                            }
                        }
                        None => {
                            chunks.push(raw_fence_chunk(
                                &body,
                                fence_body_start,
                                body_end,
                                relative_path,
                                &fingerprint,
                                file_id,
                                &mut chunk_index,
                            ));
                        }
                    }
                }

                i = (body_end + 1).min(lines.len()).max(j);
                prose_start = i;
                continue;
            }

            i += 1;
        }

        flush_prose(
            &lines,
            prose_start,
            lines.len(),
            relative_path,
            &fingerprint,
            file_id,
            &mut chunk_index,
            &mut chunks,
        );

        IndexShard {
            file_id,
            symbols,
            chunks,
            imports: Vec::new(),
            quality: if had_error { Quality::Partial } else { Quality::Full },
        }
    }
}

impl MarkdownPlugin {
    /// Delegate a fenced code block to the plugin registered for `lang`,
    /// rebasing its chunks' line numbers onto the whole file.
    fn delegate_fence(
        &self,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        body: &str,
        lang: Language,
        line_offset: usize,
    ) -> Option<IndexShard> {
        if lang == Language::Unknown {
            return None;
        }
        let plugin = self.registry.primary_plugin_for(lang)?;
        let mut shard = plugin.extract(file_id, relative_path, content_hash, body, lang);
        for chunk in &mut shard.chunks {
            chunk.line_start += line_offset as u32;
            chunk.line_end += line_offset as u32;
        }
        for symbol in &mut shard.symbols {
            symbol.line_start += line_offset as u32;
            symbol.line_end += line_offset as u32;
        }
        Some(shard)
    }
}

fn heading_level(trimmed: &str) -> Option<u32> {
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes >= 1 && hashes <= 6 && trimmed.as_bytes().get(hashes).is_none_or(u8::is_ascii_whitespace) {
        Some(hashes as u32)
    } else {
        None
    }
}

#[allow(clippy::too_many_arguments)]
fn flush_prose(
    lines: &[&str],
    start: usize,
    end: usize,
    relative_path: &str,
    fingerprint: &str,
    file_id: FileId,
    chunk_index: &mut u32,
    chunks: &mut Vec<Chunk>,
) {
    if end <= start {
        return;
    }
    let content = lines[start..end].join("\n").trim().to_string();
    if content.len() < MIN_FALLBACK_CHUNK_LEN {
        return;
    }
    chunks.push(Chunk {
        chunk_id: compute_chunk_id(&content),
        node_id: compute_node_id(&format!("{relative_path}#doc#{start}"), "doc_section"),
        file_fingerprint_id: fingerprint.to_string(),
        symbol_hash: None,
        definition_id: None,
        content,
        file_id,
        line_start: start as u32 + 1,
        line_end: end as u32,
        byte_start: 0,
        byte_end: 0,
        chunk_type: ChunkType::Doc,
        language: Language::Markdown,
        node_type: "doc_section".to_string(),
        parent_chunk_id: None,
        depth: 0,
        chunk_index: {
            let idx = *chunk_index;
            *chunk_index += 1;
            idx
        },
        token_count: token_count(&lines[start..end].join("\n")),
        tokenizer: TOKENIZER_NAME.to_string(),
    });
}

fn raw_fence_chunk(
    body: &str,
    start: usize,
    end: usize,
    relative_path: &str,
    fingerprint: &str,
    file_id: FileId,
    chunk_index: &mut u32,
) -> Chunk {
    Chunk {
        chunk_id: compute_chunk_id(body),
        node_id: compute_node_id(&format!("{relative_path}#fence#{start}"), "fenced_block"),
        file_fingerprint_id: fingerprint.to_string(),
        symbol_hash: None,
        definition_id: None,
        content: body.to_string(),
        file_id,
        line_start: start as u32 + 1,
        line_end: end as u32,
        byte_start: 0,
        byte_end: 0,
        chunk_type: ChunkType::Data,
        language: Language::Unknown,
        node_type: "fenced_block".to_string(),
        parent_chunk_id: None,
        depth: 0,
        chunk_index: {
            let idx = *chunk_index;
            *chunk_index += 1;
            idx
        },
        token_count: token_count(body),
        tokenizer: TOKENIZER_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PluginRegistry;

    struct EmptyRegistry;
    impl PluginRegistry for EmptyRegistry {
        fn plugins_for(&self, _language: Language) -> Vec<Arc<dyn LanguagePlugin>> {
            Vec::new()
        }
    }

    #[test]
    fn splits_prose_and_unrecognized_fences() {
        let plugin = MarkdownPlugin::new(Arc::new(EmptyRegistry));
        let content = "# Title\n\nSome explanatory prose that is long enough to keep.\n\n```made-up-lang\nraw contents here\n```\n\nMore trailing prose that also clears the minimum length check.\n";
        let shard = plugin.extract(FileId(1), "README.md", "hash", content, Language::Markdown);
        assert!(shard.chunks.iter().any(|c| c.chunk_type == ChunkType::Doc));
        assert!(shard.chunks.iter().any(|c| c.node_type == "fenced_block"));
        assert!(shard.symbols.iter().any(|s| s.name == "Title"));
    }
}
