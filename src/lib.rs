//! A transport-agnostic JSON-RPC 2.0 dispatch engine.
//!
//! This library turns decoded JSON payloads into JSON-RPC 2.0 responses. It
//! owns the protocol layer (request validation, method routing, batch
//! handling, notification semantics and error mapping) and leaves byte
//! transport to thin bindings or to the embedding application.
//!
//! # Design Goals
//!
//! Dispatch never fails. Whatever a payload contains and whatever a handler
//! or interceptor does, [`Dispatcher::dispatch`] returns a
//! [`DispatchResult`] that is a valid JSON-RPC 2.0 reply (or no reply at all
//! for notifications). Handlers are plain closures; typed parameters and
//! results go through serde.
//!
//! # Architecture
//!
//! [`types`] contains the wire model: request ids, requests, responses,
//! error objects and the reserved error codes.
//!
//! [`parser`] and [`validator`] turn a raw JSON object into a [`Request`]
//! and check it against the protocol rules.
//!
//! [`registry`] maps method names to [`MethodHandler`]s and enforces the
//! registration rules. [`typed`] adapts typed functions into handlers.
//!
//! [`resolver`] maps every failure to the error object sent on the wire.
//!
//! [`interceptor`] defines pipeline hooks and ships a method access filter.
//!
//! [`notification`] decides where notification handlers run: inline, on a
//! worker pool or on a Tokio runtime.
//!
//! [`dispatcher`] ties these together. [`config`] holds its settings.
//!
//! [`server`] and [`transports`] move messages over stdio or in-memory
//! channels. With the `axum` feature, `axum` serves the engine over HTTP.
//!
//! [`error`] defines the internal failure type threaded through all stages.
//!
//! # Quick Start
//!
//! ```
//! use jsonrpc_dispatch::Dispatcher;
//! use serde_json::json;
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register_unary("add", |(a, b): (i64, i64)| Ok(a + b))?;
//!
//! let result = dispatcher.dispatch(&json!({
//!     "jsonrpc": "2.0", "method": "add", "params": [1, 2], "id": 1
//! }));
//! assert_eq!(
//!     result.to_json()?,
//!     Some(json!({"jsonrpc": "2.0", "result": 3, "id": 1}))
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Struct Parameters
//!
//! ```
//! use jsonrpc_dispatch::Dispatcher;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct InitializeParams {
//!     name: String,
//!     version: String,
//! }
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register_unary("initialize", |params: InitializeParams| {
//!     Ok(format!("{} v{} initialized", params.name, params.version))
//! })?;
//! # Ok::<(), jsonrpc_dispatch::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Handlers return `Result<T, Error>`. A declared fault keeps its code and
//! message; its `data` is only sent when `include-error-data` is enabled.
//! [`Error::InvalidArgument`] becomes INVALID_PARAMS and anything else
//! INTERNAL_ERROR.
//!
//! ```
//! use jsonrpc_dispatch::{Dispatcher, Error};
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register_unary("divide", |(a, b): (i64, i64)| {
//!     if b == 0 {
//!         return Err(Error::rpc(-32000, "Division by zero"));
//!     }
//!     Ok(a / b)
//! })?;
//! # Ok::<(), Error>(())
//! ```
//!
//! # Batch Requests
//!
//! A JSON array is a batch. Entries are handled in order, notifications
//! produce no entry in the reply, and a batch of only notifications produces
//! no reply. Empty and oversized batches get a single INVALID_REQUEST
//! response. Over NDJSON a batch must sit on a single line:
//!
//! ```json
//! [{"jsonrpc":"2.0","method":"add","params":[1,2],"id":"1"},{"jsonrpc":"2.0","method":"add","params":[3,4],"id":"2"}]
//! ```
//!
//! # Serving
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use jsonrpc_dispatch::{Dispatcher, Server};
//!
//! let dispatcher = Arc::new(Dispatcher::new());
//! dispatcher.register_unary("echo", |params: serde_json::Value| Ok(params))?;
//! Server::new(dispatcher).run()?;
//! # Ok::<(), jsonrpc_dispatch::Error>(())
//! ```

pub use config::DispatcherConfig;
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::Error;
pub use interceptor::{Interceptor, MethodAccessInterceptor};
pub use notification::{
    DirectNotificationExecutor, NotificationExecutor, ThreadPoolNotificationExecutor,
    TokioNotificationExecutor,
};
pub use registry::{ConflictPolicy, MethodHandler, MethodRegistry};
pub use resolver::{DefaultExceptionResolver, ExceptionResolver};
pub use server::Server;
pub use shutdown::ShutdownSignal;
pub use transports::{InMemory, Stdio, Transport};
pub use types::{DispatchResult, ErrorCode, ErrorObject, Request, RequestId, Response};

#[cfg(feature = "axum")]
pub mod axum;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod interceptor;
pub mod notification;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod shutdown;
pub mod transports;
pub mod typed;
pub mod types;
pub mod validator;
