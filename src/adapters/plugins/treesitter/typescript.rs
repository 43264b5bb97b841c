use super::extract_with_grammar;
use crate::domain::chunking::LanguageConfig;
use crate::domain::ports::LanguagePlugin;
use crate::domain::types::{FileId, IndexShard, Language};

/// Tree-sitter TypeScript plugin. Uses the plain TypeScript grammar; `.tsx`
/// files still parse (JSX constructs fall through to `ERROR` nodes and the
/// walk degrades that file's chunks to `Quality::Partial`) rather than
/// requiring a second grammar selected by extension.
pub struct TypeScriptPlugin {
    config: LanguageConfig,
}

impl TypeScriptPlugin {
    pub fn new() -> Self {
        Self {
            config: LanguageConfig::javascript(),
        }
    }
}

impl Default for TypeScriptPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguagePlugin for TypeScriptPlugin {
    fn plugin_id(&self) -> &'static str {
        "treesitter.typescript"
    }

    fn supported_languages(&self) -> &'static [Language] {
        &[Language::TypeScript]
    }

    fn extract(
        &self,
        file_id: FileId,
        relative_path: &str,
        content_hash: &str,
        content: &str,
        language: Language,
    ) -> IndexShard {
        extract_with_grammar(
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            &self.config,
            file_id,
            relative_path,
            content_hash,
            content,
            language,
        )
    }
}
