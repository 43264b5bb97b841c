//! Generic fallback plugin (spec §4.1, §4.2): claims any language with no
//! tree-sitter grammar registered, using `GenericFallbackChunker` directly.
//! Always produces `Quality::Fallback` shards.

use crate::domain::chunking::{GenericFallbackChunker, LanguageConfig};
use crate::domain::ports::LanguagePlugin;
use crate::domain::types::{FileId, IndexShard, Language, Quality};

/// Per-language regex configuration, falling back to whole-file chunking
/// for languages with no recognized block-start patterns.
pub struct RegexFallbackPlugin {
    languages: &'static [Language],
    config: LanguageConfig,
}

impl RegexFallbackPlugin {
    /// Build a fallback plugin claiming `languages`, using `config`'s
    /// `fallback_patterns` to detect block starts. `languages` is leaked
    /// once per plugin instance (one per process) to satisfy the
    /// `'static` return type `LanguagePlugin::supported_languages` needs.
    pub fn new(languages: Vec<Language>, config: LanguageConfig) -> Self {
        Self {
            languages: Box::leak(languages.into_boxed_slice()),
            config,
        }
    }

    /// A fallback plugin with no block-start patterns, claiming
    /// `languages` and chunking each file whole.
    pub fn whole_file(languages: Vec<Language>) -> Self {
        Self::new(
            languages,
            LanguageConfig {
                extraction_rules: Vec::new(),
                fallback_patterns: Vec::new(),
                max_chunk_tokens: crate::domain::constants::DEFAULT_MAX_CHUNK_TOKENS,
            },
        )
    }
}

impl LanguagePlugin for RegexFallbackPlugin {
    fn plugin_id(&self) -> &'static str {
        "regex_fallback"
    }

    fn supported_languages(&self) -> &'static [Language] {
        self.languages
    }

    fn extract(
        &self,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        content: &str,
        language: Language,
    ) -> IndexShard {
        let chunker = GenericFallbackChunker::new(&self.config);
        let chunks = chunker.chunk_with_patterns(content, file_id, relative_path, content_hash, language);
        IndexShard {
            file_id,
            symbols: Vec::new(),
            chunks,
            imports: Vec::new(),
            quality: Quality::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_file_plugin_emits_one_chunk_for_short_content() {
        let plugin = RegexFallbackPlugin::whole_file(vec![Language::Shell]);
        let shard = plugin.extract(FileId(1), "script.sh", "hash", "#!/bin/sh\necho hi\n", Language::Shell);
        assert_eq!(shard.quality, Quality::Fallback);
        assert_eq!(shard.chunks.len(), 1);
    }
}
