//! End-to-end coverage of the index/search round trip over a real
//! SQLite-backed storage engine: indexing a small repository, incremental
//! re-indexing, symbol lookup, and lexical search.

#[path = "common/mod.rs"]
mod common;

use codeindex_mcp::domain::ports::SearchFilters;
use codeindex_mcp::domain::types::SymbolKind;

const RUST_SOURCE: &str = r#"
pub struct Greeter {
    name: String,
}

impl Greeter {
    pub fn greet(&self) -> String {
        format!("hello, {}", self.name)
    }
}

pub fn build_greeter(name: &str) -> Greeter {
    Greeter { name: name.to_string() }
}
"#;

#[tokio::test]
async fn indexes_a_repository_and_finds_symbols_and_text() {
    let engine = common::build_engine().await;
    engine.write_file("src/greeter.rs", RUST_SOURCE);

    let summary = engine.index().await.expect("index repository");
    assert_eq!(summary.files_indexed, 1);
    assert_eq!(summary.files_scanned, 1);

    let hits = engine
        .query
        .lookup_symbol("build_greeter", None, 10)
        .await
        .expect("lookup_symbol");
    assert!(hits.iter().any(|h| h.relative_path == "src/greeter.rs"));

    let (fulltext, total) = engine
        .storage
        .fulltext_search("greet", &SearchFilters::default(), 10, 0)
        .await
        .expect("fulltext_search");
    assert!(total > 0);
    assert!(fulltext.iter().any(|hit| hit.relative_path == "src/greeter.rs"));
}

#[tokio::test]
async fn reindexing_unchanged_file_is_skipped() {
    let engine = common::build_engine().await;
    engine.write_file("src/greeter.rs", RUST_SOURCE);

    let first = engine.index().await.expect("first index pass");
    assert_eq!(first.files_indexed, 1);
    assert_eq!(first.files_skipped_unchanged, 0);

    let second = engine.index().await.expect("second index pass");
    assert_eq!(second.files_indexed, 0);
    assert_eq!(second.files_skipped_unchanged, 1);
}

#[tokio::test]
async fn editing_a_file_reindexes_it() {
    let engine = common::build_engine().await;
    engine.write_file("src/greeter.rs", RUST_SOURCE);
    engine.index().await.expect("first index pass");

    engine.write_file(
        "src/greeter.rs",
        &format!("{RUST_SOURCE}\npub fn farewell() -> &'static str {{ \"bye\" }}\n"),
    );
    let second = engine.index().await.expect("second index pass");
    assert_eq!(second.files_indexed, 1);
    assert_eq!(second.files_skipped_unchanged, 0);

    let hits = engine
        .query
        .lookup_symbol("farewell", None, 10)
        .await
        .expect("lookup_symbol");
    assert!(!hits.is_empty());
}

#[tokio::test]
async fn lookup_symbol_round_trips_through_get_definition() {
    let engine = common::build_engine().await;
    engine.write_file("src/greeter.rs", RUST_SOURCE);
    engine.index().await.expect("index repository");

    let hits = engine
        .query
        .lookup_symbol("build_greeter", Some(SymbolKind::Function), 5)
        .await
        .expect("lookup_symbol");
    let hit = hits.first().expect("at least one hit for build_greeter");

    let resolved = engine
        .query
        .get_definition(&hit.symbol_hash)
        .await
        .expect("get_definition")
        .expect("definition resolves");

    assert_eq!(resolved.relative_path, hit.relative_path);
    assert_eq!(resolved.line, hit.line);
    assert_eq!(resolved.symbol_hash, hit.symbol_hash);
}

#[tokio::test]
async fn reindex_file_updates_a_single_path_without_a_full_walk() {
    let engine = common::build_engine().await;
    engine.write_file("src/greeter.rs", RUST_SOURCE);
    engine.write_file("src/other.rs", "pub fn other() {}\n");
    engine.index().await.expect("initial index pass");

    engine.write_file("src/greeter.rs", "pub fn renamed_symbol() {}\n");
    engine
        .indexing
        .reindex_file(engine.storage.clone(), engine.root_path(), "src/greeter.rs")
        .await
        .expect("reindex_file");

    let hits = engine
        .query
        .lookup_symbol("renamed_symbol", None, 10)
        .await
        .expect("lookup_symbol");
    assert!(!hits.is_empty());

    let stale = engine
        .query
        .lookup_symbol("build_greeter", None, 10)
        .await
        .expect("lookup_symbol");
    assert!(stale.is_empty(), "old symbol should not survive a reindex of its file");
}
