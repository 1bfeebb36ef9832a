//! Axum integration for the dispatch engine.
//!
//! Enable the `axum` feature to use it:
//!
//! ```toml
//! [dependencies]
//! jsonrpc-dispatch = { version = "0.1", features = ["axum"] }
//! ```
//!
//! The handler reads the HTTP body, decodes it, runs [`Dispatcher::dispatch`]
//! on Tokio's blocking pool and maps the outcome to an HTTP status through an
//! [`HttpStatusStrategy`]. Axum owns the HTTP transport; the engine owns the
//! JSON-RPC semantics.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use jsonrpc_dispatch::Dispatcher;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Arc::new(Dispatcher::new());
//! dispatcher.register_unary("echo", |params: serde_json::Value| Ok(params))?;
//!
//! let app = jsonrpc_dispatch::axum::router(dispatcher, "/jsonrpc");
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use ::axum::Router;
use ::axum::body::Bytes;
use ::axum::extract::{Request, State};
use ::axum::response::{IntoResponse, Response};
use ::axum::routing::post;
use http::{HeaderMap, StatusCode, header};
use http_body_util::LengthLimitError;
use serde_json::Value;
use tracing::{debug, error};

use crate::dispatcher::Dispatcher;
use crate::server::{encode_response, encode_result};
use crate::types::{DispatchResult, ErrorObject, RequestId, Response as RpcResponse};

/// Picks the HTTP status for each kind of outcome.
///
/// The reply hooks see what will be sent, so a strategy can map particular
/// error codes to HTTP errors.
pub trait HttpStatusStrategy: Send + Sync {
    /// A non-batch reply.
    fn single(&self, response: &RpcResponse) -> StatusCode {
        let _ = response;
        StatusCode::OK
    }

    /// A batch reply. `responses` is never empty.
    fn batch(&self, responses: &[RpcResponse]) -> StatusCode {
        let _ = responses;
        StatusCode::OK
    }

    /// Only notifications were dispatched, so there is no body.
    fn no_content(&self) -> StatusCode {
        StatusCode::NO_CONTENT
    }

    /// The body was empty or not valid JSON.
    fn parse_error(&self) -> StatusCode {
        StatusCode::OK
    }

    /// The body exceeded [`Dispatcher::max_request_bytes`].
    fn payload_too_large(&self) -> StatusCode {
        StatusCode::PAYLOAD_TOO_LARGE
    }
}

/// 200 for every reply with a body (parse errors included), 204 without
/// one, 413 for oversized bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHttpStatusStrategy;

impl HttpStatusStrategy for DefaultHttpStatusStrategy {}

/// Shared state of the JSON-RPC route.
#[derive(Clone)]
pub struct JsonRpcState {
    dispatcher: Arc<Dispatcher>,
    status: Arc<dyn HttpStatusStrategy>,
}

impl JsonRpcState {
    /// State with the default status strategy.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self::with_status_strategy(dispatcher, DefaultHttpStatusStrategy)
    }

    /// State with a custom status strategy.
    pub fn with_status_strategy<S>(dispatcher: Arc<Dispatcher>, status: S) -> Self
    where
        S: HttpStatusStrategy + 'static,
    {
        Self {
            dispatcher,
            status: Arc::new(status),
        }
    }
}

/// A router serving JSON-RPC on `POST path`.
pub fn router(dispatcher: Arc<Dispatcher>, path: &str) -> Router {
    router_with_state(JsonRpcState::new(dispatcher), path)
}

/// A router serving JSON-RPC on `POST path` with the given state.
pub fn router_with_state(state: JsonRpcState, path: &str) -> Router {
    Router::new().route(path, post(handler)).with_state(state)
}

/// Axum handler for JSON-RPC requests.
///
/// Bodies over [`Dispatcher::max_request_bytes`] are rejected before they are
/// buffered when `Content-Length` announces them, and while reading
/// otherwise.
pub async fn handler(State(state): State<JsonRpcState>, request: Request) -> Response {
    let limit = state.dispatcher.max_request_bytes();

    if declared_length(request.headers()).is_some_and(|length| length > limit) {
        debug!(limit, "Rejecting oversized request body");
        return too_large(&state);
    }

    let bytes: Bytes = match ::axum::body::to_bytes(request.into_body(), limit).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            debug!(limit, "Request body exceeded limit while reading");
            return too_large(&state);
        }
        Err(e) => {
            debug!(error = %e, "Failed to read request body");
            return parse_error(&state);
        }
    };

    let payload: Value = match serde_json::from_slice(&bytes) {
        Ok(payload) => payload,
        Err(e) => {
            debug!(error = %e, "Failed to parse JSON body");
            return parse_error(&state);
        }
    };

    let dispatcher = Arc::clone(&state.dispatcher);
    let result = match tokio::task::spawn_blocking(move || dispatcher.dispatch(&payload)).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Dispatch task failed");
            let response = RpcResponse::error(RequestId::Null, ErrorObject::internal_error());
            return json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                encode_response(&response),
            );
        }
    };

    match status_for(state.status.as_ref(), &result) {
        Some(status) => json_response(status, encode_result(&result)),
        None => {
            debug!("Notifications only, no response body");
            state.status.no_content().into_response()
        }
    }
}

/// `None` when there is no body to send.
fn status_for(status: &dyn HttpStatusStrategy, result: &DispatchResult) -> Option<StatusCode> {
    if !result.has_response() {
        return None;
    }
    if result.is_batch() {
        return Some(status.batch(result.responses()));
    }
    result.single_response().map(|response| status.single(response))
}

/// Whether reading failed because the body hit the size limit.
fn exceeds_limit(error: &::axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn parse_error(state: &JsonRpcState) -> Response {
    json_response(
        state.status.parse_error(),
        encode_response(&Dispatcher::parse_error_response()),
    )
}

fn too_large(state: &JsonRpcState) -> Response {
    json_response(
        state.status.payload_too_large(),
        encode_response(&Dispatcher::payload_too_large_response()),
    )
}

fn json_response(status: StatusCode, body: Option<String>) -> Response {
    match body {
        Some(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
