//! Handler contract: the synchronous request/response boundary (spec §4.8, §6).
//!
//! The transport that carries `{id, method, params}` frames to and from a
//! byte stream is out of scope; this trait is what that transport calls
//! into. `server::handler` provides the concrete implementation wired to
//! the Dispatcher and Query Engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminator carried by every response (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Partial,
    Error,
}

/// A typed warning attached to a `partial` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseWarning {
    pub kind: String,
    pub detail: String,
}

/// `{code, message, data?}` error payload (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One request: `{id, method, params}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// One response: `{id, status, result? | error?}`.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub id: String,
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<ResponseWarning>,
}

impl Response {
    /// Build an `ok` response.
    pub fn ok(id: String, result: Value) -> Self {
        Self {
            id,
            status: ResponseStatus::Ok,
            result: Some(result),
            error: None,
            warnings: Vec::new(),
        }
    }

    /// Build a `partial` response carrying best-effort results and warnings.
    pub fn partial(id: String, result: Value, warnings: Vec<ResponseWarning>) -> Self {
        Self {
            id,
            status: ResponseStatus::Partial,
            result: Some(result),
            error: None,
            warnings,
        }
    }

    /// Build an `error` response from a domain error.
    pub fn error(id: String, err: &crate::domain::error::Error) -> Self {
        Self {
            id,
            status: ResponseStatus::Error,
            result: None,
            error: Some(ResponseError {
                code: err.code().to_string(),
                message: err.to_string(),
                data: None,
            }),
            warnings: Vec::new(),
        }
    }
}

/// One operation per request (spec §4.8). Unknown methods must fail with
/// `Unsupported` rather than panicking.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Dispatch `request` to the matching operation and produce a response.
    /// Never returns `Err`: all failures are encoded in the response itself.
    async fn handle(&self, request: Request) -> Response;
}
