use super::extract_with_grammar;
use crate::domain::chunking::LanguageConfig;
use crate::domain::ports::LanguagePlugin;
use crate::domain::types::{FileId, IndexShard, Language};

/// Tree-sitter JavaScript plugin: functions, methods, classes.
pub struct JavaScriptPlugin {
    config: LanguageConfig,
}

impl JavaScriptPlugin {
    pub fn new() -> Self {
        Self {
            config: LanguageConfig::javascript(),
        }
    }
}

impl Default for JavaScriptPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguagePlugin for JavaScriptPlugin {
    fn plugin_id(&self) -> &'static str {
        "treesitter.javascript"
    }

    fn supported_languages(&self) -> &'static [Language] {
        &[Language::JavaScript]
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
            tree_sitter_javascript::LANGUAGE.into(),
            &self.config,
            file_id,
            relative_path,
            content_hash,
            content,
            language,
        )
    }
}
