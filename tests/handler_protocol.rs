//! Response envelope behaviour at the `Handler` boundary (spec §4.8, §7):
//! status discriminators, unknown-method handling, and the `index_repo` /
//! `get_status` / `search_code` operations end to end.

#[path = "common/mod.rs"]
mod common;

use codeindex_mcp::domain::error::Result;
use codeindex_mcp::domain::ports::{EmbeddingProvider, Handler, Request, ResponseStatus};
use std::sync::Arc;
use std::time::Duration;
use serde_json::json;

/// An embedder that outlives any reasonable per-request deadline, used to
/// exercise the Handler's `tokio::time::timeout` enforcement.
struct SlowEmbeddingProvider;

#[async_trait::async_trait]
impl EmbeddingProvider for SlowEmbeddingProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(vec![0.0, 1.0])
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        "slow-test-model"
    }
}

#[tokio::test]
async fn unknown_method_returns_an_error_response_not_a_panic() {
    let engine = common::build_engine().await;
    let response = engine
        .handler
        .handle(Request {
            id: "1".into(),
            method: "delete_everything".into(),
            params: json!({}),
        })
        .await;

    assert_eq!(response.status, ResponseStatus::Error);
    let error = response.error.expect("error payload present");
    assert_eq!(error.code, "Unsupported");
}

#[tokio::test]
async fn index_repo_then_get_status_reports_nonzero_counts() {
    let engine = common::build_engine().await;
    engine.write_file("src/lib.rs", "pub fn hello() {}\n");

    let index_response = engine
        .handler
        .handle(Request {
            id: "1".into(),
            method: "index_repo".into(),
            params: json!({ "path": engine.root_path().to_string_lossy() }),
        })
        .await;
    assert_eq!(index_response.status, ResponseStatus::Ok);

    let status_response = engine
        .handler
        .handle(Request {
            id: "2".into(),
            method: "get_status".into(),
            params: json!({}),
        })
        .await;
    assert_eq!(status_response.status, ResponseStatus::Ok);
    let result = status_response.result.expect("get_status result");
    assert!(result["stats"]["file_count"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn search_code_rejects_an_empty_query_as_invalid_argument() {
    let engine = common::build_engine().await;
    let response = engine
        .handler
        .handle(Request {
            id: "1".into(),
            method: "search_code".into(),
            params: json!({ "query": "" }),
        })
        .await;

    assert_eq!(response.status, ResponseStatus::Error);
    let error = response.error.expect("error payload present");
    assert_eq!(error.code, "InvalidArgument");
}

#[tokio::test]
async fn a_request_exceeding_the_deadline_returns_a_timeout_error() {
    let engine = common::build_engine_with(
        Some(Arc::new(SlowEmbeddingProvider) as Arc<dyn EmbeddingProvider>),
        Some(Duration::from_millis(20)),
    )
    .await;
    engine.write_file("src/lib.rs", "pub fn hello() {}\n");
    engine.index().await.expect("index repository");

    let response = engine
        .handler
        .handle(Request {
            id: "1".into(),
            method: "search_code".into(),
            params: json!({ "query": "hello", "semantic": true }),
        })
        .await;

    assert_eq!(response.status, ResponseStatus::Error);
    let error = response.error.expect("error payload present");
    assert_eq!(error.code, "Timeout");
}

#[tokio::test]
async fn search_code_with_offset_past_the_result_count_returns_empty_ok() {
    let engine = common::build_engine().await;
    engine.write_file("src/lib.rs", "pub fn only_one_hit_marker() {}\n");
    engine.index().await.expect("index repository");

    let response = engine
        .handler
        .handle(Request {
            id: "1".into(),
            method: "search_code".into(),
            params: json!({ "query": "only_one_hit_marker", "offset": 50 }),
        })
        .await;

    assert_eq!(response.status, ResponseStatus::Ok);
    let result = response.result.expect("search_code result");
    assert!(result["hits"].as_array().expect("hits array").is_empty());
    assert!(result["total"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn search_code_finds_indexed_content_through_the_handler() {
    let engine = common::build_engine().await;
    engine.write_file("src/lib.rs", "pub fn searchable_marker() {}\n");
    engine
        .handler
        .handle(Request {
            id: "1".into(),
            method: "index_repo".into(),
            params: json!({ "path": engine.root_path().to_string_lossy() }),
        })
        .await;

    let response = engine
        .handler
        .handle(Request {
            id: "2".into(),
            method: "search_code".into(),
            params: json!({ "query": "searchable_marker" }),
        })
        .await;

    assert_eq!(response.status, ResponseStatus::Ok);
    let result = response.result.expect("search_code result");
    let hits = result["hits"].as_array().expect("hits array");
    assert!(!hits.is_empty());
}
