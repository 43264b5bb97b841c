use super::extract_with_grammar;
use crate::domain::chunking::LanguageConfig;
use crate::domain::ports::LanguagePlugin;
use crate::domain::types::{FileId, IndexShard, Language};

/// Tree-sitter Rust plugin: functions, impls, traits, structs, enums, modules.
pub struct RustPlugin {
    config: LanguageConfig,
}

impl RustPlugin {
    pub fn new() -> Self {
        Self {
            config: LanguageConfig::rust(),
        }
    }
}

impl Default for RustPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguagePlugin for RustPlugin {
    fn plugin_id(&self) -> &'static str {
        "treesitter.rust"
    }

    fn supported_languages(&self) -> &'static [Language] {
        &[Language::Rust]
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
            tree_sitter_rust::LANGUAGE.into(),
            &self.config,
            file_id,
            relative_path,
            content_hash,
            content,
            language,
        )
    }
}
