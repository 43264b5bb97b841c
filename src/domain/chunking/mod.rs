//! Language-aware chunking (spec §4.3).
//!
//! ## Architecture
//!
//! ```text
//! File bytes
//!     ↓
//! Language detection (extension → Language)
//!     ↓
//! Plugin Registry picks a LanguagePlugin
//!     ├── tree-sitter plugin: parse, then engine::walk over the tree
//!     └── fallback plugin: fallback::GenericFallbackChunker (regex + braces)
//!     ↓
//! IndexShard { chunks, symbols, imports, quality }
//! ```
//!
//! Chunking never fails: unparseable content degrades through the fallback
//! chunker to a single whole-file chunk rather than returning an error
//! (spec §9, "every plugin entry point must be total").

pub mod config;
pub mod engine;
pub mod fallback;
pub mod ids;

pub use config::{LanguageConfig, NodeExtractionRule, NodeExtractionRuleBuilder};
pub use engine::{walk, WalkContext, WalkOutput};
pub use fallback::GenericFallbackChunker;

use std::sync::OnceLock;
use tiktoken_rs::CoreBPE;

fn tokenizer() -> &'static CoreBPE {
    static TOKENIZER: OnceLock<CoreBPE> = OnceLock::new();
    TOKENIZER.get_or_init(|| tiktoken_rs::cl100k_base().expect("cl100k_base encoder is static data"))
}

/// Count tokens under the `cl100k_base` encoding persisted on every chunk.
pub fn token_count(content: &str) -> u32 {
    tokenizer().encode_with_special_tokens(content).len() as u32
}
