use super::extract_with_grammar;
use crate::domain::chunking::LanguageConfig;
use crate::domain::ports::LanguagePlugin;
use crate::domain::types::{FileId, IndexShard, Language};

/// Tree-sitter Python plugin: functions and classes.
pub struct PythonPlugin {
    config: LanguageConfig,
}

impl PythonPlugin {
    pub fn new() -> Self {
        Self {
            config: LanguageConfig::python(),
        }
    }
}

impl Default for PythonPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguagePlugin for PythonPlugin {
    fn plugin_id(&self) -> &'static str {
        "treesitter.python"
    }

    fn supported_languages(&self) -> &'static [Language] {
        &[Language::Python]
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
            tree_sitter_python::LANGUAGE.into(),
            &self.config,
            file_id,
            relative_path,
            content_hash,
            content,
            language,
        )
    }
}
