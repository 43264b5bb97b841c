//! Language Plugin contract (spec §4.2).
//!
//! Every plugin entry point must be total: a plugin never returns an error
//! for malformed source, it degrades `IndexShard::quality` to `Partial` or
//! `Fallback` instead. Plugins are synchronous and pure — the Dispatcher
//! supplies the file bytes and owns the timeout/retry policy.

use crate::domain::types::{IndexShard, Language};

/// A language-aware (or document-aware) extractor.
///
/// Implementations must be side-effect free and safe to invoke from any
/// thread in the Dispatcher's worker pool.
pub trait LanguagePlugin: Send + Sync {
    /// Stable identifier used in circuit breaker keys and logs.
    fn plugin_id(&self) -> &'static str;

    /// Languages this plugin can handle.
    fn supported_languages(&self) -> &'static [Language];

    /// Extract symbols and chunks from `content`. Must never panic or
    /// return an error for malformed input — degrade `IndexShard::quality`
    /// instead.
    fn extract(
        &self,
        file_id: crate::domain::types::FileId,
        relative_path: &str,
        content_hash: &str,
        content: &str,
        language: Language,
    ) -> IndexShard;
}
