//! Transport wrapper: translates rmcp's `ServerHandler` calls into
//! `domain::ports::Handler` requests and back. All operation logic lives in
//! `server::handler`; this module only knows about tool names, JSON schemas,
//! and rmcp's result types.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData as McpError, Implementation,
    ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use schemars::schema_for;
use serde_json::Value;

use crate::domain::ports::{Handler, Request, ResponseStatus};

use super::args::{
    FindReferencesArgs, GetDefinitionArgs, GetStatusArgs, IndexRepoArgs, LookupSymbolArgs,
    ReindexFileArgs, SearchCodeArgs,
};

/// One entry in the static tool table: name, description, and the schema
/// used to advertise its arguments to clients.
struct ToolSpec {
    name: &'static str,
    description: &'static str,
    schema: fn() -> Value,
}

fn schema_of<T: schemars::JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(Value::Null)
}

const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "index_repo",
        description: "Index (or re-index from scratch) a repository tree",
        schema: schema_of::<IndexRepoArgs>,
    },
    ToolSpec {
        name: "get_status",
        description: "Report indexing progress and aggregate counts",
        schema: schema_of::<GetStatusArgs>,
    },
    ToolSpec {
        name: "lookup_symbol",
        description: "Exact-then-prefix symbol name lookup",
        schema: schema_of::<LookupSymbolArgs>,
    },
    ToolSpec {
        name: "search_code",
        description: "Lexical, semantic, or hybrid code search",
        schema: schema_of::<SearchCodeArgs>,
    },
    ToolSpec {
        name: "get_definition",
        description: "Resolve a symbol hash to its declaration location",
        schema: schema_of::<GetDefinitionArgs>,
    },
    ToolSpec {
        name: "find_references",
        description: "All known reference sites for a symbol",
        schema: schema_of::<FindReferencesArgs>,
    },
    ToolSpec {
        name: "reindex_file",
        description: "Re-index a single file by repository-relative path",
        schema: schema_of::<ReindexFileArgs>,
    },
];

/// rmcp-facing server. Holds the one `Handler` that does all the work; this
/// type exists purely to satisfy `ServerHandler`'s shape.
pub struct McpServer {
    handler: Arc<dyn Handler>,
}

impl McpServer {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "context-browser".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Index a repository, then look up symbols, search code, or follow references."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = TOOLS
            .iter()
            .map(|spec| Tool {
                name: Cow::Borrowed(spec.name),
                description: Some(Cow::Borrowed(spec.description)),
                input_schema: Arc::new(
                    (spec.schema)()
                        .as_object()
                        .cloned()
                        .unwrap_or_default(),
                ),
                annotations: None,
            })
            .collect();
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let params = request
            .arguments
            .map(Value::Object)
            .unwrap_or(Value::Null);

        let response = self
            .handler
            .handle(Request {
                id: request.name.to_string(),
                method: request.name.to_string(),
                params,
            })
            .await;

        let is_error = matches!(response.status, ResponseStatus::Error);
        let body = serde_json::to_string(&response)
            .unwrap_or_else(|_| "{\"status\":\"error\"}".to_string());

        Ok(CallToolResult {
            content: vec![Content::text(body)],
            is_error: Some(is_error),
        })
    }
}
