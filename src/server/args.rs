//! Tool argument types for the seven operations the Handler exposes
//! (spec §4.8). Deserialized from each MCP `CallToolRequestParam`'s
//! `arguments` object and schema-advertised to clients via `schemars`.

use schemars::JsonSchema;
use serde::Deserialize;

fn default_limit() -> usize {
    20
}

fn default_offset() -> usize {
    0
}

/// Arguments for `index_repo`.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(description = "Index (or re-index from scratch) a repository tree")]
pub struct IndexRepoArgs {
    /// Absolute or relative path to the repository root.
    pub path: String,
}

/// Arguments for `get_status`. Carries no fields; repository identity comes
/// from the handler's bound repository.
#[derive(Debug, Deserialize, JsonSchema, Default)]
#[schemars(description = "Report indexing progress and aggregate counts")]
pub struct GetStatusArgs {}

/// Arguments for `lookup_symbol`.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(description = "Exact-then-prefix symbol name lookup")]
pub struct LookupSymbolArgs {
    /// Symbol name or name prefix.
    pub name: String,
    /// Restrict to one declaration kind.
    #[serde(default)]
    pub kind: Option<String>,
    /// Maximum results to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Arguments for `search_code`.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(description = "Lexical, semantic, or hybrid code search")]
pub struct SearchCodeArgs {
    /// Free-text query.
    pub query: String,
    /// Whether to also run semantic search and blend scores.
    #[serde(default)]
    pub semantic: bool,
    /// Restrict results to a glob over relative paths.
    #[serde(default)]
    pub path_glob: Option<String>,
    /// Restrict results to one language (canonical lowercase name).
    #[serde(default)]
    pub language: Option<String>,
    /// Restrict results to chunks overlapping a symbol of this kind.
    #[serde(default)]
    pub symbol_kind: Option<String>,
    /// Maximum results to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Pagination offset.
    #[serde(default = "default_offset")]
    pub offset: usize,
}

/// Arguments for `get_definition`.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(description = "Resolve a symbol hash to its declaration location")]
pub struct GetDefinitionArgs {
    /// `symbol_hash` from an earlier `lookup_symbol` result.
    pub symbol_hash: String,
}

/// Arguments for `find_references`.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(description = "All known reference sites for a symbol")]
pub struct FindReferencesArgs {
    /// `symbol_hash` from an earlier `lookup_symbol` result.
    pub symbol_hash: String,
}

/// Arguments for `reindex_file`.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(description = "Re-index a single file by repository-relative path")]
pub struct ReindexFileArgs {
    /// Repository-relative path of the file to re-index.
    pub path: String,
}
