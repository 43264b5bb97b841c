//! Stable ID computation (spec §3, §4.3).
//!
//! Five digests identify different facets of a chunk or symbol:
//! - `chunk_id` — content-addressed; identical normalized text always yields
//!   the same id, regardless of where it appears.
//! - `node_id` — structural; identifies a position in a parse tree
//!   independent of content.
//! - `file_fingerprint_id` — identifies the file version a shard was
//!   produced from.
//! - `symbol_hash` — identifies a declaration by qualified name and kind,
//!   independent of its body.
//! - `definition_id` — identifies a declaration's signature only, stable
//!   across body-only edits.
//!
//! Normalization rule (resolves the content-addressing Open Question):
//! collapse runs of whitespace to a single space and trim the ends, then
//! hash with SHA-256. This is the only normalization applied; re-chunking
//! identical bytes is bit-identical.

use sha2::{Digest, Sha256};

/// Collapse whitespace runs to a single space and trim the ends.
pub fn normalize_content(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last_was_space = false;
    for ch in content.chars() {
        if ch.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

fn hex_digest(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Content-addressed id of a chunk's normalized text.
pub fn compute_chunk_id(content: &str) -> String {
    let normalized = normalize_content(content);
    hex_digest(&[normalized.as_bytes()])
}

/// Structural id of `(parse-tree-path, node-type)`.
pub fn compute_node_id(tree_path: &str, node_type: &str) -> String {
    hex_digest(&[tree_path.as_bytes(), node_type.as_bytes()])
}

/// Id of the file version that produced a shard.
pub fn compute_file_fingerprint_id(relative_path: &str, content_hash: &str) -> String {
    hex_digest(&[relative_path.as_bytes(), content_hash.as_bytes()])
}

/// Id of a declaration's signature only (the part before its body).
pub fn compute_definition_id(qualified_name: &str, signature: &str) -> String {
    hex_digest(&[qualified_name.as_bytes(), signature.as_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_whitespace() {
        assert_eq!(normalize_content("  fn  foo( ) {\n  }  "), "fn foo( ) { }");
    }

    #[test]
    fn chunk_id_is_stable_across_whitespace_variants() {
        let a = compute_chunk_id("fn foo() {\n    1\n}");
        let b = compute_chunk_id("fn foo() {     1 }");
        assert_eq!(a, b);
    }

    #[test]
    fn chunk_id_changes_with_content() {
        let a = compute_chunk_id("fn foo() {}");
        let b = compute_chunk_id("fn bar() {}");
        assert_ne!(a, b);
    }

    #[test]
    fn definition_id_ignores_body() {
        let sig = "fn foo(x: i32) -> i32";
        let a = compute_definition_id("crate::foo", sig);
        let b = compute_definition_id("crate::foo", sig);
        assert_eq!(a, b);
    }
}
