//! Container-node walk: the core tree-sitter-driven chunking algorithm
//! (spec §4.3). Walks a parse tree depth-first, and whenever it encounters
//! a node type listed in the active [`LanguageConfig`], emits a chunk (and,
//! if the rule declares one, a symbol) for that node's byte range. Nodes
//! not marked `recurse` stop the walk at their own boundary; nodes marked
//! `recurse` also walk their children, so nested declarations (a method
//! inside an `impl`) become their own chunks with `parent_chunk_id` set.

use super::config::{LanguageConfig, NodeExtractionRule};
use super::ids::{compute_chunk_id, compute_definition_id, compute_file_fingerprint_id, compute_node_id};
use crate::domain::constants::TOKENIZER_NAME;
use crate::domain::types::{Chunk, ChunkType, FileId, Language, Symbol, SymbolKind};
use tree_sitter::Node;

/// Everything the walk needs that stays constant across the whole file.
pub struct WalkContext<'a> {
    pub source: &'a str,
    pub config: &'a LanguageConfig,
    pub file_id: FileId,
    pub relative_path: &'a str,
    pub content_hash: &'a str,
    pub language: Language,
}

/// Output of a container-node walk over one file's parse tree.
#[derive(Debug, Default)]
pub struct WalkOutput {
    pub chunks: Vec<Chunk>,
    pub symbols: Vec<Symbol>,
}

/// Walk `root`, emitting chunks/symbols for every node matching a rule in
/// `ctx.config`.
pub fn walk(root: Node<'_>, ctx: &WalkContext<'_>) -> WalkOutput {
    let mut out = WalkOutput::default();
    let mut chunk_index = 0u32;
    walk_node(root, ctx, None, 0, &mut chunk_index, "", &mut out);
    out
}

#[allow(clippy::too_many_arguments)]
fn walk_node(
    node: Node<'_>,
    ctx: &WalkContext<'_>,
    parent_chunk_id: Option<&str>,
    depth: u32,
    chunk_index: &mut u32,
    tree_path: &str,
    out: &mut WalkOutput,
) {
    if let Some(rule) = find_rule(ctx.config, node.kind()) {
        let whole_tokens = crate::domain::chunking::token_count(
            &ctx.source[node.start_byte()..node.end_byte()],
        );

        if whole_tokens <= ctx.config.max_chunk_tokens {
            let (chunk, symbol) = emit(node, ctx, rule, parent_chunk_id, depth, chunk_index, tree_path, false);
            let next_parent = chunk.chunk_id.clone();
            out.chunks.push(chunk);
            if let Some(symbol) = symbol {
                out.symbols.push(symbol);
            }

            if rule.recurse_into_children {
                let child_path = format!("{tree_path}/{}", node.kind());
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    walk_node(
                        child,
                        ctx,
                        Some(&next_parent),
                        depth + 1,
                        chunk_index,
                        &child_path,
                        out,
                    );
                }
            }
            return;
        }

        // Over budget: emit a header-only chunk for the container itself,
        // then always recurse (regardless of `recurse_into_children`) so
        // its body is covered by nested chunks instead of one oversized one.
        // Runs of children that don't match a rule of their own are batched
        // into `Mixed` chunks once their combined size would also overflow.
        let (chunk, symbol) = emit(node, ctx, rule, parent_chunk_id, depth, chunk_index, tree_path, true);
        let next_parent = chunk.chunk_id.clone();
        out.chunks.push(chunk);
        if let Some(symbol) = symbol {
            out.symbols.push(symbol);
        }

        let child_path = format!("{tree_path}/{}", node.kind());
        let mut pending: Vec<Node<'_>> = Vec::new();
        let mut pending_tokens = 0u32;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            distribute(
                child,
                ctx,
                &next_parent,
                depth + 1,
                chunk_index,
                &child_path,
                out,
                &mut pending,
                &mut pending_tokens,
            );
        }
        flush_pending(&mut pending, ctx, &next_parent, depth + 1, chunk_index, &child_path, out);
        return;
    }

    let child_path = format!("{tree_path}/{}", node.kind());
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_node(child, ctx, parent_chunk_id, depth, chunk_index, &child_path, out);
    }
}

/// True if `node` or any descendant matches a rule in `config`, used by
/// [`distribute`] to tell apart structural wrapper nodes (which must be
/// descended into) from genuinely bare content (which can be batched into a
/// `Mixed` chunk as a single unit).
fn subtree_has_rule_match(node: Node<'_>, config: &LanguageConfig) -> bool {
    if find_rule(config, node.kind()).is_some() {
        return true;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|child| subtree_has_rule_match(child, config))
}

/// Route one child of an over-budget container: a rule match flushes
/// whatever is pending and recurses through the normal container walk
/// (so it can itself split further if still oversized); bare content with
/// no rule match anywhere inside it is batched into `pending`, flushed to a
/// `Mixed` chunk once the batch would overflow the budget; a structural
/// wrapper node with no rule of its own but a rule match somewhere inside
/// (e.g. a block enclosing several declarations) is descended into with
/// the same pending buffer, so its non-matching members still get batched.
#[allow(clippy::too_many_arguments)]
fn distribute<'a>(
    node: Node<'a>,
    ctx: &WalkContext<'_>,
    parent_chunk_id: &str,
    depth: u32,
    chunk_index: &mut u32,
    tree_path: &str,
    out: &mut WalkOutput,
    pending: &mut Vec<Node<'a>>,
    pending_tokens: &mut u32,
) {
    if find_rule(ctx.config, node.kind()).is_some() {
        flush_pending(pending, ctx, parent_chunk_id, depth, chunk_index, tree_path, out);
        *pending_tokens = 0;
        walk_node(node, ctx, Some(parent_chunk_id), depth, chunk_index, tree_path, out);
        return;
    }

    if !subtree_has_rule_match(node, ctx.config) {
        let tokens = crate::domain::chunking::token_count(&ctx.source[node.start_byte()..node.end_byte()]);
        if tokens == 0 {
            return;
        }
        pending.push(node);
        *pending_tokens += tokens;
        if *pending_tokens > ctx.config.max_chunk_tokens {
            flush_pending(pending, ctx, parent_chunk_id, depth, chunk_index, tree_path, out);
            *pending_tokens = 0;
        }
        return;
    }

    let child_path = format!("{tree_path}/{}", node.kind());
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        distribute(child, ctx, parent_chunk_id, depth, chunk_index, &child_path, out, pending, pending_tokens);
    }
}

/// Emit the nodes buffered in `pending` as one `Mixed` chunk spanning their
/// combined byte range, then clear the buffer. No-op on an empty buffer.
#[allow(clippy::too_many_arguments)]
fn flush_pending(
    pending: &mut Vec<Node<'_>>,
    ctx: &WalkContext<'_>,
    parent_chunk_id: &str,
    depth: u32,
    chunk_index: &mut u32,
    tree_path: &str,
    out: &mut WalkOutput,
) {
    if pending.is_empty() {
        return;
    }
    let byte_start = pending[0].start_byte();
    let byte_end = pending[pending.len() - 1].end_byte();
    let content = ctx.source[byte_start..byte_end].to_string();
    let start_pos = pending[0].start_position();
    let end_pos = pending[pending.len() - 1].end_position();
    let fingerprint = compute_file_fingerprint_id(ctx.relative_path, ctx.content_hash);
    let node_id = compute_node_id(&format!("{tree_path}#mixed#{byte_start}"), "mixed_region");
    let token_count = crate::domain::chunking::token_count(&content);

    out.chunks.push(Chunk {
        chunk_id: compute_chunk_id(&content),
        node_id,
        file_fingerprint_id: fingerprint,
        symbol_hash: None,
        definition_id: None,
        content,
        file_id: ctx.file_id,
        line_start: start_pos.row as u32 + 1,
        line_end: end_pos.row as u32 + 1,
        byte_start: byte_start as u32,
        byte_end: byte_end as u32,
        chunk_type: ChunkType::Mixed,
        language: ctx.language,
        node_type: "mixed_region".to_string(),
        parent_chunk_id: Some(parent_chunk_id.to_string()),
        depth,
        chunk_index: {
            let idx = *chunk_index;
            *chunk_index += 1;
            idx
        },
        token_count,
        tokenizer: TOKENIZER_NAME.to_string(),
    });
    pending.clear();
}

fn find_rule<'a>(config: &'a LanguageConfig, node_kind: &str) -> Option<&'a NodeExtractionRule> {
    config
        .extraction_rules
        .iter()
        .find(|rule| rule.node_type == node_kind)
}

fn emit(
    node: Node<'_>,
    ctx: &WalkContext<'_>,
    rule: &NodeExtractionRule,
    parent_chunk_id: Option<&str>,
    depth: u32,
    chunk_index: &mut u32,
    tree_path: &str,
    header_only: bool,
) -> (Chunk, Option<Symbol>) {
    let byte_start = node.start_byte();
    let full_byte_end = node.end_byte();
    let byte_end = if header_only {
        node.child_by_field_name("body")
            .map(|b| b.start_byte())
            .unwrap_or(full_byte_end)
            .max(byte_start)
    } else {
        full_byte_end
    };
    let content = ctx.source[byte_start..byte_end].to_string();
    let start_pos = node.start_position();
    let end_pos = if header_only {
        node.child_by_field_name("body")
            .map(|b| b.start_position())
            .unwrap_or_else(|| node.end_position())
    } else {
        node.end_position()
    };

    let node_id = compute_node_id(tree_path, node.kind());
    let fingerprint = compute_file_fingerprint_id(ctx.relative_path, ctx.content_hash);

    let name = rule
        .name_field
        .and_then(|field| node.child_by_field_name(field))
        .and_then(|n| ctx.source.get(n.start_byte()..n.end_byte()))
        .map(str::to_string);

    let qualified_name = name
        .as_deref()
        .map(|n| format!("{}::{n}", ctx.relative_path))
        .unwrap_or_else(|| format!("{}::{tree_path}", ctx.relative_path));

    let symbol_hash = rule
        .symbol_kind
        .map(|kind| Symbol::compute_symbol_hash(&qualified_name, kind));

    let signature = name.as_deref().map(|n| {
        let header_end = node
            .child_by_field_name("body")
            .map(|b| b.start_byte())
            .unwrap_or(byte_end);
        ctx.source
            .get(byte_start..header_end)
            .unwrap_or(n)
            .trim()
            .to_string()
    });

    let definition_id = signature
        .as_deref()
        .map(|sig| compute_definition_id(&qualified_name, sig));

    let token_count = crate::domain::chunking::token_count(&content);

    let chunk = Chunk {
        chunk_id: compute_chunk_id(&content),
        node_id,
        file_fingerprint_id: fingerprint,
        symbol_hash: symbol_hash.clone(),
        definition_id: definition_id.clone(),
        content,
        file_id: ctx.file_id,
        line_start: start_pos.row as u32 + 1,
        line_end: end_pos.row as u32 + 1,
        byte_start: byte_start as u32,
        byte_end: byte_end as u32,
        chunk_type: rule.chunk_type,
        language: ctx.language,
        node_type: node.kind().to_string(),
        parent_chunk_id: parent_chunk_id.map(str::to_string),
        depth,
        chunk_index: {
            let idx = *chunk_index;
            *chunk_index += 1;
            idx
        },
        token_count,
        tokenizer: TOKENIZER_NAME.to_string(),
    };

    let symbol = rule.symbol_kind.map(|kind| Symbol {
        file_id: ctx.file_id,
        name: name.unwrap_or_else(|| qualified_name.clone()),
        kind,
        line_start: start_pos.row as u32 + 1,
        line_end: end_pos.row as u32 + 1,
        column_start: start_pos.column as u32,
        signature,
        parent_symbol: None,
        visibility: visibility_of(node, ctx.source),
        modifiers: Vec::new(),
        docstring: None,
        token_count: Some(token_count),
        symbol_hash: symbol_hash.unwrap_or_default(),
    });

    (chunk, symbol)
}

fn visibility_of(node: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|child| child.kind() == "visibility_modifier")
        .and_then(|child| source.get(child.start_byte()..child.end_byte()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FileId;
    use tree_sitter::Parser;

    fn walk_rust(source: &str, max_chunk_tokens: u32) -> WalkOutput {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .expect("load rust grammar");
        let tree = parser.parse(source, None).expect("parse rust source");
        let mut config = LanguageConfig::rust();
        config.max_chunk_tokens = max_chunk_tokens;
        let ctx = WalkContext {
            source,
            config: &config,
            file_id: FileId(1),
            relative_path: "src/lib.rs",
            content_hash: "hash",
            language: Language::Rust,
        };
        walk(tree.root_node(), &ctx)
    }

    #[test]
    fn a_function_under_budget_becomes_one_chunk() {
        let source = "fn small() -> u32 { 1 + 1 }\n";
        let out = walk_rust(source, 400);
        assert_eq!(out.chunks.len(), 1);
        assert_eq!(out.chunks[0].chunk_type, ChunkType::Code);
    }

    #[test]
    fn an_oversized_impl_splits_into_a_header_plus_mixed_and_method_chunks() {
        let source = r#"
impl Greeter {
    fn hello(&self) -> &str { "hello" }

    const BANNER: &'static str = "a very long constant string used to push this impl block over a tiny token budget so it must be split into more than one chunk";

    fn bye(&self) -> &str { "bye" }
}
"#;
        let out = walk_rust(source, 10);

        let header = out
            .chunks
            .iter()
            .find(|c| c.node_type == "impl_item")
            .expect("impl header chunk present");
        assert!(!header.content.contains("fn bye"), "header chunk must not contain the whole body");

        let methods: Vec<_> = out.chunks.iter().filter(|c| c.node_type == "function_item").collect();
        assert_eq!(methods.len(), 2);
        assert!(methods.iter().all(|c| c.parent_chunk_id.as_deref() == Some(header.chunk_id.as_str())));

        assert!(
            out.chunks.iter().any(|c| c.chunk_type == ChunkType::Mixed),
            "the oversized const field between methods should flush as a mixed chunk"
        );
    }
}
