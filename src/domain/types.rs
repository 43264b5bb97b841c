//! Core domain types for the indexing and retrieval engine.
//!
//! These are the entities described in spec §3: repositories, files, symbols,
//! chunks, move records, lexical postings, and embeddings. All are plain,
//! serializable value objects — no behaviour lives here beyond small
//! constructors and invariant checks.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Stable repository identity: a hex digest of the canonical absolute path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId(pub [u8; 32]);

impl RepositoryId {
    /// Derive a repository id from a canonical absolute path.
    pub fn from_path(canonical_path: &Path) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical_path.to_string_lossy().as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Hex-encoded form, used as the on-disk index directory name.
    pub fn to_hex(self) -> String {
        hex_encode(&self.0)
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A repository root known to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Stable identity derived from the canonical absolute path.
    pub id: RepositoryId,
    /// Canonical absolute path to the repository root.
    pub root_path: String,
    /// Schema version of this repository's index.
    pub schema_version: u32,
    /// Unix timestamp of index creation.
    pub created_at: i64,
    /// Unix timestamp of the most recent completed index update.
    pub last_indexed_at: Option<i64>,
}

/// Opaque, stable file identity (survives renames).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub i64);

/// A tracked source file (spec §3 "File record").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Primary key within `files`.
    pub id: FileId,
    /// Owning repository.
    pub repository_id: RepositoryId,
    /// Path relative to the repository root; primary identity within a repo.
    pub relative_path: String,
    /// Cryptographic digest of file bytes (move detection, incremental skip).
    pub content_hash: String,
    /// Detected language, or `Unknown` if undetected.
    pub language: Language,
    /// File size in bytes.
    pub size: u64,
    /// Unix timestamp this file's content was last observed.
    pub last_seen_at: i64,
    /// Soft-delete marker; symbols/chunks survive until compaction.
    pub is_deleted: bool,
}

/// Programming and document languages the engine can parse.
///
/// The registry maps extensions to these variants; plugins are registered
/// per-variant in `adapters::plugins::registry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    Swift,
    Kotlin,
    Shell,
    Json,
    Yaml,
    Toml,
    Markdown,
    PlainText,
    Unknown,
}

impl Language {
    /// Detect a language from a lowercase file extension (no leading dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Self::Rust,
            "py" | "pyi" => Self::Python,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "go" => Self::Go,
            "java" => Self::Java,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "hpp" => Self::Cpp,
            "cs" => Self::CSharp,
            "rb" => Self::Ruby,
            "php" => Self::Php,
            "swift" => Self::Swift,
            "kt" | "kts" => Self::Kotlin,
            "sh" | "bash" | "zsh" => Self::Shell,
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            "toml" => Self::Toml,
            "md" | "markdown" => Self::Markdown,
            "txt" => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Detect a language from its canonical name (`as_str()`'s inverse),
    /// used for markdown fence tags (```rust, ```python) and for decoding
    /// the `language` column persisted by storage, neither of which are
    /// file extensions.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "rust" => Self::Rust,
            "python" => Self::Python,
            "javascript" => Self::JavaScript,
            "typescript" => Self::TypeScript,
            "go" => Self::Go,
            "java" => Self::Java,
            "c" => Self::C,
            "cpp" | "c++" => Self::Cpp,
            "csharp" | "c#" => Self::CSharp,
            "ruby" => Self::Ruby,
            "php" => Self::Php,
            "swift" => Self::Swift,
            "kotlin" => Self::Kotlin,
            "shell" | "bash" | "sh" => Self::Shell,
            "json" => Self::Json,
            "yaml" => Self::Yaml,
            "toml" => Self::Toml,
            "markdown" | "md" => Self::Markdown,
            "plaintext" | "text" => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Canonical lowercase name, used in config filters and chunk metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Go => "go",
            Self::Java => "java",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "csharp",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::Swift => "swift",
            Self::Kotlin => "kotlin",
            Self::Shell => "shell",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Markdown => "markdown",
            Self::PlainText => "plaintext",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolKind {
    Module,
    Namespace,
    Class,
    Interface,
    Struct,
    Enum,
    Function,
    Method,
    Constructor,
    Field,
    Property,
    Variable,
    Constant,
    TypeAlias,
    Import,
}

impl SymbolKind {
    /// Priority used to break symbol-lookup ties (lower sorts first).
    pub fn priority(self) -> u8 {
        match self {
            Self::Class | Self::Struct | Self::Interface | Self::Enum => 0,
            Self::Function | Self::Method | Self::Constructor => 1,
            Self::Module | Self::Namespace => 2,
            Self::TypeAlias => 3,
            Self::Field | Self::Property | Self::Variable | Self::Constant => 4,
            Self::Import => 5,
        }
    }
}

/// A declared symbol extracted by a language plugin (spec §3 "Symbol").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Owning file.
    pub file_id: FileId,
    /// Symbol name as written in source.
    pub name: String,
    /// Declaration kind.
    pub kind: SymbolKind,
    /// 1-based inclusive start line.
    pub line_start: u32,
    /// 1-based inclusive end line.
    pub line_end: u32,
    /// 1-based inclusive start column.
    pub column_start: u32,
    /// Declaration signature, when the language exposes one.
    pub signature: Option<String>,
    /// Name of the enclosing symbol, if any.
    pub parent_symbol: Option<String>,
    /// Source-level visibility (`pub`, `private`, ...), if expressed.
    pub visibility: Option<String>,
    /// Modifiers such as `async`, `static`, `abstract`.
    pub modifiers: Vec<String>,
    /// Attached docstring, if convention-matched.
    pub docstring: Option<String>,
    /// Token count of the declaration body, if chunked.
    pub token_count: Option<u32>,
    /// Digest of `(qualified_name, kind)`; stable cross-reference key.
    pub symbol_hash: String,
}

impl Symbol {
    /// `(qualified_name, kind)` digest used for cross-references (spec §3).
    pub fn compute_symbol_hash(qualified_name: &str, kind: SymbolKind) -> String {
        let mut hasher = Sha256::new();
        hasher.update(qualified_name.as_bytes());
        hasher.update([0u8]);
        hasher.update(format!("{kind:?}").as_bytes());
        hex_encode(&hasher.finalize())
    }
}

/// Retrieval-unit classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    Code,
    Comment,
    Doc,
    Data,
    Mixed,
}

/// A chunk of retrievable content (spec §3 "Chunk").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Content-addressed digest of normalized chunk text.
    pub chunk_id: String,
    /// Structural digest of `(parse-tree-path, node-type)`.
    pub node_id: String,
    /// Digest identifying the file version that produced this chunk.
    pub file_fingerprint_id: String,
    /// Digest of `(qualified_name, kind)` when the chunk is a declared symbol.
    pub symbol_hash: Option<String>,
    /// Digest of the declaration's signature only; stable across body edits.
    pub definition_id: Option<String>,
    /// The chunk's raw text.
    pub content: String,
    /// Owning file.
    pub file_id: FileId,
    /// 1-based inclusive start line.
    pub line_start: u32,
    /// 1-based inclusive end line.
    pub line_end: u32,
    /// Inclusive-exclusive byte offsets within the file.
    pub byte_start: u32,
    /// End byte offset (exclusive).
    pub byte_end: u32,
    /// Retrieval classification.
    pub chunk_type: ChunkType,
    /// Detected language of the containing file.
    pub language: Language,
    /// Parse node type the chunk was extracted from (or `"raw"`/`"fallback"`).
    pub node_type: String,
    /// Parent chunk, when this chunk is nested (e.g. a method inside a class).
    pub parent_chunk_id: Option<String>,
    /// Nesting depth, 0 at the file root.
    pub depth: u32,
    /// Stable total order among sibling chunks.
    pub chunk_index: u32,
    /// Token count under the named tokenizer model.
    pub token_count: u32,
    /// Name of the tokenizer used to compute `token_count`.
    pub tokenizer: String,
}

/// A detected file rename (spec §3 "Move record").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveType {
    Rename,
    Relocate,
    Restructure,
}

/// Record of a file move inferred from a delete+create pair with matching hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMove {
    /// Path before the move.
    pub old_relative_path: String,
    /// Path after the move.
    pub new_relative_path: String,
    /// Content hash shared by both sides of the move.
    pub content_hash: String,
    /// Unix timestamp the move was detected.
    pub moved_at: i64,
    /// Classification of how much the path changed.
    pub move_type: MoveType,
}

/// A vector embedding of a chunk (spec §3 "Embedding").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Owning file, denormalized for fast filtering.
    pub file_id: FileId,
    /// Embedded chunk.
    pub chunk_id: String,
    /// Name of the embedding model used.
    pub model_name: String,
    /// Declared output dimensionality of the model.
    pub model_dimension: u32,
    /// The embedding vector itself.
    pub vector: Vec<f32>,
}

/// Shard annotation reflecting how much structure a plugin recovered
/// (spec §4.2, §9: "every plugin entry point must be total").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Full AST-based extraction succeeded.
    Full,
    /// Partial structure recovered (parser errors absorbed, fallback used for some nodes).
    Partial,
    /// No structure recovered; a single raw/fallback chunk only.
    Fallback,
}

/// The output of one plugin invocation on one file (spec §9 "Shard").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexShard {
    /// File this shard was produced from.
    pub file_id: FileId,
    /// Symbols extracted.
    pub symbols: Vec<Symbol>,
    /// Chunks extracted.
    pub chunks: Vec<Chunk>,
    /// Import/include statements, as written (qualified names or paths).
    pub imports: Vec<String>,
    /// How much structure was recovered.
    pub quality: Quality,
}

/// A typed warning attached to a `partial` response (spec §7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    /// Error kind that produced this warning (see `Error::code`).
    pub kind: String,
    /// Human-readable detail.
    pub detail: String,
}

/// A debounced, move-resolved filesystem event (spec §4.7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileEventKind {
    Created,
    Modified,
    Deleted,
    /// Delete+create pair with matching `content_hash`, resolved within the
    /// move window.
    Moved {
        /// The path the file lived at before the move.
        old_relative_path: String,
    },
}

/// One event handed from the File Watcher to the Dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEvent {
    /// Repository the event belongs to.
    pub repository_id: RepositoryId,
    /// Path relative to the repository root.
    pub relative_path: String,
    /// What happened.
    pub kind: FileEventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_inverts_as_str_for_every_named_language() {
        for lang in [
            Language::Rust,
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
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
            Language::Markdown,
            Language::PlainText,
        ] {
            assert_eq!(Language::from_name(lang.as_str()), lang);
        }
    }

    #[test]
    fn from_name_does_not_accept_extensions() {
        assert_eq!(Language::from_name("rs"), Language::Unknown);
        assert_eq!(Language::from_name("py"), Language::Unknown);
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(Language::from_name("Rust"), Language::Rust);
        assert_eq!(Language::from_name("JAVASCRIPT"), Language::JavaScript);
    }
}
