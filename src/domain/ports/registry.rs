//! Plugin Registry contract (spec §4.1).

use super::plugin::LanguagePlugin;
use crate::domain::types::Language;
use std::sync::Arc;

/// Selects the plugin(s) responsible for a file.
///
/// The registry is an explicitly constructed table, not a reflection-based
/// discovery mechanism (spec §9): every plugin is registered by name in
/// `StaticPluginRegistry::with_defaults`.
pub trait PluginRegistry: Send + Sync {
    /// All plugins registered for `language`, in priority order. Markdown
    /// and other document plugins may register alongside a code plugin for
    /// the same extension (S4: overlapping plugins on one file).
    fn plugins_for(&self, language: Language) -> Vec<Arc<dyn LanguagePlugin>>;

    /// The single highest-priority plugin for `language`, if any is registered.
    fn primary_plugin_for(&self, language: Language) -> Option<Arc<dyn LanguagePlugin>> {
        self.plugins_for(language).into_iter().next()
    }
}
