//! Scenario S4: a markdown file with a fenced Rust block should index both
//! the surrounding prose and the delegated Rust symbols, and the two
//! plugins' chunks must not claim overlapping line ranges.

#[path = "common/mod.rs"]
mod common;

const MARKDOWN_WITH_RUST_FENCE: &str = r#"# Usage

This example shows how to construct a greeter and call it from your code.

```rust
pub fn build_greeter(name: &str) -> String {
    format!("hello, {}", name)
}
```

After calling `build_greeter`, the returned string is ready to print.
"#;

#[tokio::test]
async fn markdown_chunks_and_delegated_rust_chunks_do_not_overlap() {
    let engine = common::build_engine().await;
    engine.write_file("README.md", MARKDOWN_WITH_RUST_FENCE);

    let summary = engine.index().await.expect("index repository");
    assert_eq!(summary.files_indexed, 1);

    let (hits, total) = engine
        .storage
        .fulltext_search("greeter", &codeindex_mcp::domain::ports::SearchFilters::default(), 20, 0)
        .await
        .expect("fulltext_search");
    assert!(total > 0, "expected at least one chunk mentioning greeter");

    let mut ranges: Vec<(u32, u32)> = hits
        .iter()
        .filter(|h| h.relative_path == "README.md")
        .map(|h| (h.line_start, h.line_end))
        .collect();
    ranges.sort();
    for pair in ranges.windows(2) {
        let (_, prev_end) = pair[0];
        let (next_start, _) = pair[1];
        assert!(
            next_start > prev_end,
            "chunk line ranges must not overlap: {:?} vs {:?}",
            pair[0],
            pair[1]
        );
    }

    let rust_symbol = engine
        .query
        .lookup_symbol("build_greeter", None, 10)
        .await
        .expect("lookup_symbol");
    assert!(
        rust_symbol.iter().any(|h| h.relative_path == "README.md"),
        "the fenced rust function should be indexed as a symbol of the markdown file"
    );
}
