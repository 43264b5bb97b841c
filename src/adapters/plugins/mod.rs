//! Concrete `LanguagePlugin` implementations and the static registry that
//! wires them to languages (spec §4.1, §4.2).

pub mod markdown;
pub mod regex_fallback;
pub mod treesitter;

pub use markdown::MarkdownPlugin;
pub use regex_fallback::RegexFallbackPlugin;
pub use treesitter::{JavaScriptPlugin, PythonPlugin, RustPlugin, TypeScriptPlugin};

use crate::domain::ports::{LanguagePlugin, PluginRegistry};
use crate::domain::types::Language;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Explicit, non-reflective plugin table (spec §9). Every language maps to
/// a fixed, statically constructed list of plugins in priority order.
pub struct StaticPluginRegistry {
    table: HashMap<Language, Vec<Arc<dyn LanguagePlugin>>>,
}

impl StaticPluginRegistry {
    /// Build the registry with the tree-sitter, regex-fallback, and
    /// markdown plugins this engine ships, registered per language per
    /// spec §4.2.
    pub fn with_defaults() -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<StaticPluginRegistry>| {
            let self_handle: Arc<dyn PluginRegistry> = Arc::new(SelfHandle(weak.clone()));
            let mut table: HashMap<Language, Vec<Arc<dyn LanguagePlugin>>> = HashMap::new();

            table.insert(Language::Rust, vec![Arc::new(RustPlugin::new())]);
            table.insert(Language::Python, vec![Arc::new(PythonPlugin::new())]);
            table.insert(Language::JavaScript, vec![Arc::new(JavaScriptPlugin::new())]);
            table.insert(Language::TypeScript, vec![Arc::new(TypeScriptPlugin::new())]);

            let fallback_languages = [
                Language::Go,
                Language::Java,
                Language::C,
                Language::Cpp,
                Language::CSharp,
                Language::Ruby,
                Language::Php,
                Language::Swift,
                Language::Kotlin,
                Language::Shell,
                Language::Json,
                Language::Yaml,
                Language::Toml,
                Language::PlainText,
                Language::Unknown,
            ];
            let fallback: Arc<dyn LanguagePlugin> = Arc::new(RegexFallbackPlugin::whole_file(
                fallback_languages.to_vec(),
            ));
            for language in fallback_languages {
                table.insert(language, vec![fallback.clone()]);
            }

            table.insert(
                Language::Markdown,
                vec![Arc::new(MarkdownPlugin::new(self_handle))],
            );

            StaticPluginRegistry { table }
        })
    }
}

impl PluginRegistry for StaticPluginRegistry {
    fn plugins_for(&self, language: Language) -> Vec<Arc<dyn LanguagePlugin>> {
        self.table.get(&language).cloned().unwrap_or_default()
    }
}

/// Weak-upgrading handle used so the markdown plugin can hold a registry
/// reference without the registry owning itself through an `Arc` cycle.
struct SelfHandle(Weak<StaticPluginRegistry>);

impl PluginRegistry for SelfHandle {
    fn plugins_for(&self, language: Language) -> Vec<Arc<dyn LanguagePlugin>> {
        self.0
            .upgrade()
            .map(|registry| registry.plugins_for(language))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_files_route_to_the_treesitter_plugin() {
        let registry = StaticPluginRegistry::with_defaults();
        let plugins = registry.plugins_for(Language::Rust);
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].plugin_id(), "treesitter.rust");
    }

    #[test]
    fn markdown_delegates_through_a_working_self_handle() {
        let registry = StaticPluginRegistry::with_defaults();
        let plugins = registry.plugins_for(Language::Markdown);
        assert_eq!(plugins.len(), 1);
        let shard = plugins[0].extract(
            crate::domain::types::FileId(1),
            "README.md",
            "hash",
            "# Title\n\nSome prose that is definitely long enough to survive.\n",
            Language::Markdown,
        );
        assert!(!shard.chunks.is_empty());
    }
}
