//! JSON-RPC 2.0 message types.
//!
//! This module defines JSON-RPC 2.0 message types as specified in:
//! https://www.jsonrpc.org/specification

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// The only protocol version this engine accepts and emits.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method names starting with this prefix are reserved for protocol extensions.
pub const RESERVED_METHOD_PREFIX: &str = "rpc.";

/// Reserved JSON-RPC error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorCode {
    /// The numeric wire code.
    pub const fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
        }
    }

    /// The fixed default message.
    pub const fn message(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// Identifier echoed back in a response.
///
/// Only strings, numbers and `null` are valid identifiers. Anything else
/// found in a request is normalized to [`RequestId::Null`] for error reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    Null,
    Number(Number),
    String(String),
}

impl RequestId {
    /// Convert a raw JSON `id` value, returning `None` for disallowed types.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(RequestId::Null),
            Value::Number(n) => Some(RequestId::Number(n.clone())),
            Value::String(s) => Some(RequestId::String(s.clone())),
            _ => None,
        }
    }

    /// Best-effort id: absent or disallowed values collapse to `null`.
    pub fn best_effort(value: Option<&Value>) -> Self {
        value.and_then(Self::from_value).unwrap_or(RequestId::Null)
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Null => write!(f, "null"),
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => write!(f, "{}", s),
        }
    }
}

/// A single decoded call.
///
/// Produced by the request parser with a lenient field-typing policy: wrong
/// typed `jsonrpc` or `method` members become `None` so the validator can
/// reject them with a proper protocol error. `id` is `None` only when the
/// member was missing from the source object; an explicit `null` is
/// `Some(Value::Null)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    jsonrpc: Option<String>,
    id: Option<Value>,
    method: Option<String>,
    params: Option<Value>,
}

impl Request {
    /// Create a call that expects a response.
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        let id = match id {
            RequestId::Null => Value::Null,
            RequestId::Number(n) => Value::Number(n),
            RequestId::String(s) => Value::String(s),
        };
        Self::from_parts(
            Some(JSONRPC_VERSION.to_string()),
            Some(id),
            Some(method.into()),
            params,
        )
    }

    /// Create a notification (no `id` member).
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self::from_parts(
            Some(JSONRPC_VERSION.to_string()),
            None,
            Some(method.into()),
            params,
        )
    }

    pub(crate) fn from_parts(
        jsonrpc: Option<String>,
        id: Option<Value>,
        method: Option<String>,
        params: Option<Value>,
    ) -> Self {
        Self {
            jsonrpc,
            id,
            method,
            params,
        }
    }

    /// The `jsonrpc` member, if it was a string.
    pub fn jsonrpc(&self) -> Option<&str> {
        self.jsonrpc.as_deref()
    }

    /// The raw `id` member, `None` when it was absent.
    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    /// Whether the `id` member was present at all.
    pub fn id_present(&self) -> bool {
        self.id.is_some()
    }

    /// The id to echo in a response for this request.
    pub fn request_id(&self) -> RequestId {
        RequestId::best_effort(self.id.as_ref())
    }

    /// The `method` member, if it was a string.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// The raw `params` member.
    pub fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    /// True when the `id` member was absent.
    pub fn is_notification(&self) -> bool {
        !self.id_present()
    }
}

/// JSON-RPC error object as sent over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    /// Create an error object with an arbitrary code.
    pub fn new(code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    /// Error object for a reserved code with its default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code.code(), code.message(), None)
    }

    /// `-32700 Parse error`.
    pub fn parse_error() -> Self {
        Self::from_code(ErrorCode::ParseError)
    }

    /// `-32600 Invalid Request`.
    pub fn invalid_request() -> Self {
        Self::from_code(ErrorCode::InvalidRequest)
    }

    /// `-32601 Method not found`.
    pub fn method_not_found() -> Self {
        Self::from_code(ErrorCode::MethodNotFound)
    }

    /// `-32602` with a custom message.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams.code(), message, None)
    }

    /// `-32603 Internal error`.
    pub fn internal_error() -> Self {
        Self::from_code(ErrorCode::InternalError)
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// A protocol reply.
///
/// Exactly one of `result` and `error` is set; the only way to build a
/// response is through [`Response::success`] and [`Response::error`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Response {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorObject>,
    id: RequestId,
}

impl Response {
    /// A success reply carrying `result`.
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// An error reply carrying `error`.
    pub fn error(id: RequestId, error: ErrorObject) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Always `"2.0"`.
    pub fn jsonrpc(&self) -> &str {
        self.jsonrpc
    }

    /// The id echoed from the request, or null.
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// The result of a success reply.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// The error of an error reply.
    pub fn error_object(&self) -> Option<&ErrorObject> {
        self.error.as_ref()
    }

    /// Whether this is an error reply.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Outcome of one top-level `dispatch` call.
///
/// In single mode there is at most one response. In batch mode there is one
/// response per non-notification entry, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    batch: bool,
    responses: Vec<Response>,
}

impl DispatchResult {
    /// Non-batch outcome with at most one response.
    pub fn single(response: Option<Response>) -> Self {
        Self {
            batch: false,
            responses: response.into_iter().collect(),
        }
    }

    /// Batch outcome, responses in input order.
    pub fn batch(responses: Vec<Response>) -> Self {
        Self {
            batch: true,
            responses,
        }
    }

    /// Whether the payload was a batch.
    pub fn is_batch(&self) -> bool {
        self.batch
    }

    /// Whether there is anything to send.
    pub fn has_response(&self) -> bool {
        !self.responses.is_empty()
    }

    /// All responses in order.
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Take the responses out.
    pub fn into_responses(self) -> Vec<Response> {
        self.responses
    }

    /// The response of a non-batch dispatch, if one was produced.
    pub fn single_response(&self) -> Option<&Response> {
        if self.batch {
            return None;
        }
        self.responses.first()
    }

    /// Serialize the body a transport should send.
    ///
    /// Returns `None` when there is nothing to send (notifications only).
    pub fn to_json(&self) -> Result<Option<Value>, serde_json::Error> {
        if !self.has_response() {
            return Ok(None);
        }
        if self.batch {
            return serde_json::to_value(&self.responses).map(Some);
        }
        serde_json::to_value(&self.responses[0]).map(Some)
    }

    /// Like [`Self::to_json`], but straight to text with members in wire
    /// order (`jsonrpc`, `result`/`error`, `id`).
    pub fn to_json_string(&self) -> Result<Option<String>, serde_json::Error> {
        match (self.batch, self.responses.first()) {
            (_, None) => Ok(None),
            (true, Some(_)) => serde_json::to_string(&self.responses).map(Some),
            (false, Some(response)) => serde_json::to_string(response).map(Some),
        }
    }
}
