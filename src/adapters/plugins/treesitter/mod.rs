//! Tree-sitter-backed language plugins (spec §4.2, §4.3).
//!
//! Each plugin wraps a generated grammar and the shared container-node
//! walk in `domain::chunking::engine`. A parse failure (tree-sitter always
//! returns *some* tree, but it may be entirely `ERROR` nodes) degrades to
//! the fallback chunker rather than propagating an error, keeping every
//! plugin entry point total.

mod javascript;
mod python;
mod rust;
mod typescript;

pub use javascript::JavaScriptPlugin;
pub use python::PythonPlugin;
pub use rust::RustPlugin;
pub use typescript::TypeScriptPlugin;

use crate::domain::chunking::engine::{walk, WalkContext, WalkOutput};
use crate::domain::chunking::{GenericFallbackChunker, LanguageConfig};
use crate::domain::types::{FileId, IndexShard, Language, Quality};
use tree_sitter::{Language as TsLanguage, Parser};

/// Parse `content` under `grammar` and run the container-node walk,
/// falling back to regex-based chunking if the tree is unparseable or the
/// grammar can't be loaded at all.
pub(super) fn extract_with_grammar(
    grammar: TsLanguage,
    config: &LanguageConfig,
    file_id: FileId,
    relative_path: &str,
    content_hash: &str,
    content: &str,
    language: Language,
) -> IndexShard {
    let mut parser = Parser::new();
    if parser.set_language(&grammar).is_err() {
        return fallback_shard(config, file_id, relative_path, content_hash, content, language, Quality::Fallback);
    }

    let Some(tree) = parser.parse(content, None) else {
        return fallback_shard(config, file_id, relative_path, content_hash, content, language, Quality::Fallback);
    };

    let ctx = WalkContext {
        source: content,
        config,
        file_id,
        relative_path,
        content_hash,
        language,
    };
    let WalkOutput { chunks, symbols } = walk(tree.root_node(), &ctx);

    if chunks.is_empty() {
        return fallback_shard(config, file_id, relative_path, content_hash, content, language, Quality::Partial);
    }

    let quality = if tree.root_node().has_error() {
        Quality::Partial
    } else {
        Quality::Full
    };

    IndexShard {
        file_id,
        symbols,
        chunks,
        imports: Vec::new(),
        quality,
    }
}

fn fallback_shard(
    config: &LanguageConfig,
    file_id: FileId,
    relative_path: &str,
    content_hash: &str,
    content: &str,
    language: Language,
    quality: Quality,
) -> IndexShard {
    let chunker = GenericFallbackChunker::new(config);
    let chunks = chunker.chunk_with_patterns(content, file_id, relative_path, content_hash, language);
    IndexShard {
        file_id,
        symbols: Vec::new(),
        chunks,
        imports: Vec::new(),
        quality,
    }
}
