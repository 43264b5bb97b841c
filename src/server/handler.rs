//! Concrete `Handler`: binds the seven operations (spec §4.8) to the
//! Dispatcher, Indexing Service, and Query Engine for one repository.

use crate::application::indexing::IndexingService;
use crate::application::query::{QueryEngine, SearchHit};
use crate::domain::error::Error;
use crate::domain::ports::{
    Handler, Request, Response, ResponseWarning, SearchFilters, StorageEngine, SymbolLookupResult,
};
use crate::domain::types::{Language, SymbolKind};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

use super::args::{
    FindReferencesArgs, GetDefinitionArgs, GetStatusArgs, IndexRepoArgs, LookupSymbolArgs,
    ReindexFileArgs, SearchCodeArgs,
};

const DEFAULT_REQUEST_DEADLINE_MS: u64 = 2_000;

/// Binds one repository's storage handle, indexing service, and query engine
/// to the seven operations the transport layer dispatches to.
pub struct McpHandler {
    storage: Arc<dyn StorageEngine>,
    indexing: Arc<IndexingService>,
    query: Arc<QueryEngine>,
    root_path: PathBuf,
    request_deadline: Duration,
}

impl McpHandler {
    pub fn new(
        storage: Arc<dyn StorageEngine>,
        indexing: Arc<IndexingService>,
        query: Arc<QueryEngine>,
        root_path: PathBuf,
    ) -> Self {
        Self {
            storage,
            indexing,
            query,
            root_path,
            request_deadline: Duration::from_millis(DEFAULT_REQUEST_DEADLINE_MS),
        }
    }

    /// Override the per-request deadline enforced in `handle` (config key
    /// `request_deadline_ms`).
    pub fn with_request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = deadline;
        self
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<(Value, Vec<ResponseWarning>), Error> {
        match method {
            "index_repo" => self.index_repo(params).await,
            "get_status" => self.get_status(params).await,
            "lookup_symbol" => self.lookup_symbol(params).await,
            "search_code" => self.search_code(params).await,
            "get_definition" => self.get_definition(params).await,
            "find_references" => self.find_references(params).await,
            "reindex_file" => self.reindex_file(params).await,
            other => Err(Error::unsupported(format!("unknown method '{other}'"))),
        }
    }

    async fn index_repo(&self, params: Value) -> Result<(Value, Vec<ResponseWarning>), Error> {
        let args: IndexRepoArgs = parse_args(params)?;
        let path = PathBuf::from(&args.path);
        let summary = self.indexing.index_repository(self.storage.clone(), &path).await?;
        Ok((serde_json::to_value(summary)?, Vec::new()))
    }

    async fn get_status(&self, params: Value) -> Result<(Value, Vec<ResponseWarning>), Error> {
        let _args: GetStatusArgs = parse_args(params)?;
        let stats = self.storage.stats().await?;
        let repository = self.storage.repository();
        Ok((
            json!({
                "repository_id": repository.id.to_string(),
                "root_path": self.root_path.display().to_string(),
                "snapshot_id": self.storage.snapshot_id()?,
                "stats": stats,
            }),
            Vec::new(),
        ))
    }

    async fn lookup_symbol(&self, params: Value) -> Result<(Value, Vec<ResponseWarning>), Error> {
        let args: LookupSymbolArgs = parse_args(params)?;
        let kind = args
            .kind
            .as_deref()
            .map(parse_symbol_kind)
            .transpose()?;
        let hits = self.query.lookup_symbol(&args.name, kind, args.limit).await?;
        Ok((json!({ "results": hits.into_iter().map(symbol_hit_json).collect::<Vec<_>>() }), Vec::new()))
    }

    async fn search_code(&self, params: Value) -> Result<(Value, Vec<ResponseWarning>), Error> {
        let args: SearchCodeArgs = parse_args(params)?;
        let filters = SearchFilters {
            path_glob: args.path_glob,
            language: args.language.as_deref().map(parse_language).transpose()?,
            symbol_kind: args.symbol_kind.as_deref().map(parse_symbol_kind).transpose()?,
        };
        let outcome = self
            .query
            .search_code(&args.query, args.semantic, &filters, args.limit, args.offset)
            .await?;

        let result = json!({
            "hits": outcome.hits.iter().map(search_hit_json).collect::<Vec<_>>(),
            "total": outcome.total,
        });

        if outcome.degraded {
            let warning = ResponseWarning {
                kind: "degraded".to_string(),
                detail: outcome.warning.unwrap_or_else(|| "search degraded".to_string()),
            };
            return Ok((result, vec![warning]));
        }
        Ok((result, Vec::new()))
    }

    async fn get_definition(&self, params: Value) -> Result<(Value, Vec<ResponseWarning>), Error> {
        let args: GetDefinitionArgs = parse_args(params)?;
        let hit = self.query.get_definition(&args.symbol_hash).await?;
        Ok((json!({ "result": hit.map(symbol_hit_json) }), Vec::new()))
    }

    async fn find_references(&self, params: Value) -> Result<(Value, Vec<ResponseWarning>), Error> {
        let args: FindReferencesArgs = parse_args(params)?;
        let hits = self.query.find_references(&args.symbol_hash).await?;
        Ok((json!({ "results": hits.into_iter().map(symbol_hit_json).collect::<Vec<_>>() }), Vec::new()))
    }

    async fn reindex_file(&self, params: Value) -> Result<(Value, Vec<ResponseWarning>), Error> {
        let args: ReindexFileArgs = parse_args(params)?;
        self.indexing
            .reindex_file(self.storage.clone(), &self.root_path, &args.path)
            .await?;
        Ok((json!({ "path": args.path }), Vec::new()))
    }
}

#[async_trait]
impl Handler for McpHandler {
    #[instrument(skip(self, request), fields(method = %request.method))]
    async fn handle(&self, request: Request) -> Response {
        let method = request.method.clone();
        let outcome = tokio::time::timeout(self.request_deadline, self.dispatch(&method, request.params)).await;

        match outcome {
            Ok(Ok((result, warnings))) if warnings.is_empty() => Response::ok(request.id, result),
            Ok(Ok((result, warnings))) => Response::partial(request.id, result, warnings),
            Ok(Err(err)) => {
                warn!(method = %method, error = %err, "request failed");
                Response::error(request.id, &err)
            }
            Err(_elapsed) => {
                let err = Error::timeout(method.clone(), self.request_deadline.as_millis() as u64);
                warn!(method = %method, "request exceeded deadline");
                Response::error(request.id, &err)
            }
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, Error> {
    serde_json::from_value(params).map_err(|err| Error::invalid_argument(err.to_string()))
}

fn parse_language(name: &str) -> Result<Language, Error> {
    let language = [
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
        Language::Unknown,
    ]
    .into_iter()
    .find(|lang| lang.as_str() == name);
    language.ok_or_else(|| Error::invalid_argument(format!("unknown language '{name}'")))
}

fn parse_symbol_kind(name: &str) -> Result<SymbolKind, Error> {
    let kinds = [
        SymbolKind::Module,
        SymbolKind::Namespace,
        SymbolKind::Class,
        SymbolKind::Interface,
        SymbolKind::Struct,
        SymbolKind::Enum,
        SymbolKind::Function,
        SymbolKind::Method,
        SymbolKind::Constructor,
        SymbolKind::Field,
        SymbolKind::Property,
        SymbolKind::Variable,
        SymbolKind::Constant,
        SymbolKind::TypeAlias,
        SymbolKind::Import,
    ];
    kinds
        .into_iter()
        .find(|k| kebab_case(*k) == name)
        .ok_or_else(|| Error::invalid_argument(format!("unknown symbol kind '{name}'")))
}

fn kebab_case(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Module => "module",
        SymbolKind::Namespace => "namespace",
        SymbolKind::Class => "class",
        SymbolKind::Interface => "interface",
        SymbolKind::Struct => "struct",
        SymbolKind::Enum => "enum",
        SymbolKind::Function => "function",
        SymbolKind::Method => "method",
        SymbolKind::Constructor => "constructor",
        SymbolKind::Field => "field",
        SymbolKind::Property => "property",
        SymbolKind::Variable => "variable",
        SymbolKind::Constant => "constant",
        SymbolKind::TypeAlias => "type-alias",
        SymbolKind::Import => "import",
    }
}

fn symbol_hit_json(hit: SymbolLookupResult) -> Value {
    json!({
        "relative_path": hit.relative_path,
        "line": hit.line,
        "signature": hit.signature,
        "symbol_hash": hit.symbol_hash,
        "exact": hit.exact,
        "kind": kebab_case(hit.kind),
    })
}

fn search_hit_json(hit: &SearchHit) -> Value {
    json!({
        "chunk_id": hit.chunk_id,
        "relative_path": hit.relative_path,
        "line_start": hit.line_start,
        "line_end": hit.line_end,
        "snippet": hit.snippet,
        "lexical_score": hit.lexical_score,
        "semantic_score": hit.semantic_score,
        "combined_score": hit.combined_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_language_accepts_canonical_name() {
        assert_eq!(parse_language("rust").unwrap().as_str(), "rust");
    }

    #[test]
    fn parse_language_rejects_unknown_name() {
        assert!(parse_language("cobol").is_err());
    }

    #[test]
    fn parse_symbol_kind_round_trips_through_kebab_case() {
        assert_eq!(kebab_case(parse_symbol_kind("type-alias").unwrap()), "type-alias");
    }
}
