//! Language-specific chunking configuration.
//!
//! A `LanguageConfig` tells the chunker which parse-tree node types are
//! "container" nodes worth extracting as their own chunk/symbol, and gives
//! the fallback chunker a set of regex patterns to use when no tree-sitter
//! grammar is available for the language.

use crate::domain::types::{ChunkType, SymbolKind};

/// One parse-tree node type the chunker should extract as a chunk.
#[derive(Debug, Clone)]
pub struct NodeExtractionRule {
    /// The tree-sitter node kind this rule matches (e.g. `"function_item"`).
    pub node_type: &'static str,
    /// Retrieval classification assigned to chunks produced from this node.
    pub chunk_type: ChunkType,
    /// Symbol kind recorded for this node, if it declares a symbol.
    pub symbol_kind: Option<SymbolKind>,
    /// Name of the child field holding the declaration's name, if any.
    pub name_field: Option<&'static str>,
    /// Whether children of this node are also walked for nested chunks.
    pub recurse_into_children: bool,
}

impl NodeExtractionRule {
    /// Start building a rule for `node_type`.
    pub fn builder(node_type: &'static str) -> NodeExtractionRuleBuilder {
        NodeExtractionRuleBuilder {
            node_type,
            chunk_type: ChunkType::Code,
            symbol_kind: None,
            name_field: None,
            recurse_into_children: false,
        }
    }
}

/// Builder for [`NodeExtractionRule`].
pub struct NodeExtractionRuleBuilder {
    node_type: &'static str,
    chunk_type: ChunkType,
    symbol_kind: Option<SymbolKind>,
    name_field: Option<&'static str>,
    recurse_into_children: bool,
}

impl NodeExtractionRuleBuilder {
    /// Set the retrieval classification.
    pub fn chunk_type(mut self, chunk_type: ChunkType) -> Self {
        self.chunk_type = chunk_type;
        self
    }

    /// Mark this node as declaring a symbol of the given kind.
    pub fn symbol_kind(mut self, kind: SymbolKind) -> Self {
        self.symbol_kind = Some(kind);
        self
    }

    /// Name of the child field holding the declaration's name.
    pub fn name_field(mut self, field: &'static str) -> Self {
        self.name_field = Some(field);
        self
    }

    /// Allow nested container nodes inside this one to also become chunks.
    pub fn recurse(mut self) -> Self {
        self.recurse_into_children = true;
        self
    }

    /// Finish building the rule.
    pub fn build(self) -> NodeExtractionRule {
        NodeExtractionRule {
            node_type: self.node_type,
            chunk_type: self.chunk_type,
            symbol_kind: self.symbol_kind,
            name_field: self.name_field,
            recurse_into_children: self.recurse_into_children,
        }
    }
}

/// Per-language chunking configuration.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Tree-sitter node types extracted as chunks, in priority order.
    pub extraction_rules: Vec<NodeExtractionRule>,
    /// Regex patterns recognizing block starts, used by the fallback chunker.
    pub fallback_patterns: Vec<String>,
    /// Maximum tokens per chunk before further splitting is attempted.
    pub max_chunk_tokens: u32,
}

impl LanguageConfig {
    /// The Rust container-node configuration.
    pub fn rust() -> Self {
        Self {
            extraction_rules: vec![
                NodeExtractionRule::builder("function_item")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Function)
                    .name_field("name")
                    .build(),
                NodeExtractionRule::builder("impl_item")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Class)
                    .recurse()
                    .build(),
                NodeExtractionRule::builder("trait_item")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Interface)
                    .name_field("name")
                    .recurse()
                    .build(),
                NodeExtractionRule::builder("struct_item")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Struct)
                    .name_field("name")
                    .build(),
                NodeExtractionRule::builder("enum_item")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Enum)
                    .name_field("name")
                    .build(),
                NodeExtractionRule::builder("mod_item")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Module)
                    .name_field("name")
                    .recurse()
                    .build(),
            ],
            fallback_patterns: vec![
                r"^\s*(pub\s+)?fn\s+\w+".to_string(),
                r"^\s*(pub\s+)?struct\s+\w+".to_string(),
                r"^\s*(pub\s+)?enum\s+\w+".to_string(),
                r"^\s*impl\b".to_string(),
            ],
            max_chunk_tokens: crate::domain::constants::DEFAULT_MAX_CHUNK_TOKENS,
        }
    }

    /// The Python container-node configuration.
    pub fn python() -> Self {
        Self {
            extraction_rules: vec![
                NodeExtractionRule::builder("function_definition")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Function)
                    .name_field("name")
                    .build(),
                NodeExtractionRule::builder("class_definition")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Class)
                    .name_field("name")
                    .recurse()
                    .build(),
            ],
            fallback_patterns: vec![
                r"^\s*def\s+\w+".to_string(),
                r"^\s*class\s+\w+".to_string(),
                r"^\s*async\s+def\s+\w+".to_string(),
            ],
            max_chunk_tokens: crate::domain::constants::DEFAULT_MAX_CHUNK_TOKENS,
        }
    }

    /// The JavaScript/TypeScript container-node configuration.
    pub fn javascript() -> Self {
        Self {
            extraction_rules: vec![
                NodeExtractionRule::builder("function_declaration")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Function)
                    .name_field("name")
                    .build(),
                NodeExtractionRule::builder("method_definition")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Method)
                    .name_field("name")
                    .build(),
                NodeExtractionRule::builder("class_declaration")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Class)
                    .name_field("name")
                    .recurse()
                    .build(),
                NodeExtractionRule::builder("interface_declaration")
                    .chunk_type(ChunkType::Code)
                    .symbol_kind(SymbolKind::Interface)
                    .name_field("name")
                    .build(),
                NodeExtractionRule::builder("lexical_declaration")
                    .chunk_type(ChunkType::Code)
                    .build(),
            ],
            fallback_patterns: vec![
                r"^\s*(export\s+)?(async\s+)?function\s+\w+".to_string(),
                r"^\s*(export\s+)?class\s+\w+".to_string(),
                r"^\s*(export\s+)?(default\s+)?const\s+\w+\s*=\s*(\(|async)".to_string(),
            ],
            max_chunk_tokens: crate::domain::constants::DEFAULT_MAX_CHUNK_TOKENS,
        }
    }
}
